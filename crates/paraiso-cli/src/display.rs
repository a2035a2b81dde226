//! Terminal rendering for the catalog, animal cards and the profile page.
//!
//! Renderers build strings so they can be checked in tests; the `print_*`
//! wrappers write them to stdout.

use std::fmt::Write;

use paraiso_app::ProfileOverview;
use paraiso_core::records::ApplicationStatus;
use paraiso_core::{Animal, User};

const LABEL_WIDTH: usize = 26;
const MAX_LIST_ITEMS: usize = 10;

pub const LOADING: &str = "Loading…";
pub const NO_ANIMALS: &str = "No animals found.";

// ── Catalog ──

/// The catalog view: loading indicator, empty message or summary table.
pub fn render_catalog(animals: &[Animal], loading: bool) -> String {
    if loading {
        return format!("{LOADING}\n");
    }
    if animals.is_empty() {
        return format!("{NO_ANIMALS}\n");
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<14} {:<7} {:<7} {:<12} {:<7} {:<22} {}",
        "ID", "NAME", "SPECIES", "SEX", "AGE", "SIZE", "LOCATION", "STATUS"
    );
    for a in animals {
        let _ = writeln!(
            out,
            "{:<6} {:<14} {:<7} {:<7} {:<12} {:<7} {:<22} {}",
            truncate(&a.id, 6),
            truncate(&a.name, 14),
            a.species.as_str(),
            a.sex.map_or("-", |s| s.as_str()),
            truncate(or_dash(&a.age), 12),
            a.size.map_or("-", |s| s.as_str()),
            truncate(or_dash(&a.location), 22),
            a.status.label(),
        );
    }
    let _ = writeln!(out, "\n{} animal(s)", animals.len());
    out
}

pub fn print_catalog(animals: &[Animal], loading: bool) {
    print!("{}", render_catalog(animals, loading));
}

// ── Animal card ──

pub fn render_animal_card(animal: &Animal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", animal.name);
    if !animal.description.is_empty() {
        let _ = writeln!(out, "{}", animal.description);
    }
    let _ = writeln!(out);

    section(
        &mut out,
        "Identity",
        &[
            ("id", animal.id.clone()),
            ("species", animal.species.to_string()),
            ("sex", animal.sex.map(|s| s.to_string()).unwrap_or_default()),
            ("age", animal.age.clone()),
            ("size", animal.size.map(|s| s.to_string()).unwrap_or_default()),
        ],
    );
    section(
        &mut out,
        "Shelter",
        &[
            ("location", animal.location.clone()),
            ("status", animal.status.label().to_string()),
            (
                "adoption",
                if animal.is_adoptable() {
                    "open".to_string()
                } else {
                    "closed".to_string()
                },
            ),
            ("created_at", animal.created_at.clone().unwrap_or_default()),
        ],
    );
    list(&mut out, "Photos", &animal.photos);
    out
}

pub fn print_animal_card(animal: &Animal) {
    print!("{}", render_animal_card(animal));
}

// ── Profile ──

pub fn render_whoami(user: Option<&User>) -> String {
    match user {
        Some(user) => format!("{} ({})\n", user.email, user.id),
        None => "Not signed in.\n".to_string(),
    }
}

pub fn render_profile(overview: &ProfileOverview) -> String {
    let p = &overview.profile;
    let mut out = String::new();
    section(
        &mut out,
        "Profile",
        &[
            ("first_name", p.first_name.clone()),
            ("last_name", p.last_name.clone()),
            ("phone", p.phone.clone()),
            ("email", p.email.clone()),
        ],
    );

    let adoptions: Vec<String> = overview
        .adoptions
        .iter()
        .map(|a| {
            let animal = match (&a.animal_name, a.animal_species) {
                (Some(name), Some(species)) => format!("{name} ({species})"),
                (Some(name), None) => name.clone(),
                _ => format!("animal {}", a.animal_id),
            };
            entry(&animal, &a.status, a.created_at.as_deref())
        })
        .collect();
    list_or_none(&mut out, "Adoption requests", &adoptions);

    let reports: Vec<String> = overview
        .reports
        .iter()
        .map(|r| {
            let what = match &r.animal_name {
                Some(name) => format!("{name} ({})", r.species),
                None => r.species.clone(),
            };
            entry(&what, &r.status, r.created_at.as_deref())
        })
        .collect();
    list_or_none(&mut out, "Animal reports", &reports);

    let volunteering: Vec<String> = overview
        .volunteering
        .iter()
        .map(|v| entry("application", &v.status, v.created_at.as_deref()))
        .collect();
    list_or_none(&mut out, "Volunteer applications", &volunteering);
    out
}

pub fn print_profile(overview: &ProfileOverview) {
    print!("{}", render_profile(overview));
}

// ── Section rendering ──

fn section(out: &mut String, header: &str, rows: &[(&str, String)]) {
    if rows.iter().all(|(_, v)| v.is_empty()) {
        return;
    }
    let _ = writeln!(out, "{header}");
    for (label, value) in rows {
        if value.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value}");
    }
    let _ = writeln!(out);
}

fn list(out: &mut String, header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{header} ({}):", items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        let _ = writeln!(out, "  - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        let _ = writeln!(out, "  … and {} more", items.len() - MAX_LIST_ITEMS);
    }
    let _ = writeln!(out);
}

fn list_or_none(out: &mut String, header: &str, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "{header}: none\n");
    } else {
        list(out, header, items);
    }
}

fn entry(what: &str, status: &ApplicationStatus, created_at: Option<&str>) -> String {
    let date = created_at.and_then(|c| c.get(..10)).unwrap_or("-");
    format!("{date}  {what:<24} {}", status.label())
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
