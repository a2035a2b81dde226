mod console;
mod display;
mod session_file;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use paraiso_app::catalog::FEATURED_LIMIT;
use paraiso_app::uploads::load_photos;
use paraiso_app::{App, AppError, FilterChange};
use paraiso_core::forms::KeepOption;
use paraiso_core::{
    AdoptionForm, FilterCriteria, ProfileForm, ReportForm, Sex, Size, Species, VolunteerForm,
};
use paraiso_remote::{DEFAULT_BUCKET, Remote, RemoteConfig};
use paraiso_store::{
    Authenticator, Backend, MemoryAuth, MemoryBackend, MemoryStorage, ObjectStorage,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleNotifier;

#[derive(Parser, Debug)]
#[command(name = "paraiso", version, about = "Browse and help the animals of the Paraíso shelter")]
struct Cli {
    /// Backend project URL.
    #[arg(long, env = "PARAISO_URL", global = true)]
    url: Option<String>,

    /// Public anon key of the backend project.
    #[arg(long, env = "PARAISO_ANON_KEY", hide_env_values = true, global = true)]
    anon_key: Option<String>,

    /// Public bucket for uploaded photos.
    #[arg(long, env = "PARAISO_BUCKET", default_value = DEFAULT_BUCKET, global = true)]
    bucket: String,

    /// Where the signed-in session is kept between runs.
    #[arg(
        long,
        env = "PARAISO_SESSION_FILE",
        default_value = ".paraiso-session.json",
        global = true
    )]
    session_file: PathBuf,

    /// Use an in-memory store seeded with sample animals.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List animals. `all` (or nothing) leaves a filter unset.
    Animals {
        #[arg(long, default_value = "all")]
        species: String,
        #[arg(long, default_value = "all")]
        sex: String,
        #[arg(long, default_value = "all")]
        status: String,
        /// Case-insensitive text matched against name and description.
        #[arg(long, default_value_t)]
        search: String,
    },
    /// Show one animal.
    Animal { id: String },
    /// Animals featured on the landing page.
    Featured,
    /// Register interest in adopting an animal.
    Adopt {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value_t)]
        message: String,
    },
    /// Report a stray animal.
    Report(ReportArgs),
    /// Apply to volunteer at the shelter.
    Volunteer(VolunteerArgs),
    /// Create an account.
    Signup(CredentialArgs),
    /// Sign in and keep the session for later commands.
    Login(CredentialArgs),
    /// Sign out and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Your profile and submissions.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Create the public photo bucket if it is missing.
    SetupStorage,
}

#[derive(clap::Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "PARAISO_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(clap::Args, Debug)]
struct ReportArgs {
    /// Name, if the animal answers to one.
    #[arg(long = "animal-name", default_value_t)]
    animal_name: String,
    #[arg(long)]
    species: Species,
    #[arg(long)]
    sex: Option<Sex>,
    #[arg(long, default_value_t)]
    age: String,
    #[arg(long)]
    size: Option<Size>,
    #[arg(long)]
    location: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    contact_name: String,
    #[arg(long)]
    contact_phone: String,
    #[arg(long)]
    contact_email: String,
    /// yes, no or maybe.
    #[arg(long, default_value = "no")]
    can_keep: KeepOption,
    /// Photo files, uploaded in the order given.
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct VolunteerArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value_t)]
    age: String,
    #[arg(long)]
    availability: String,
    #[arg(long, default_value_t)]
    experience: String,
    #[arg(long)]
    reason: String,
    #[arg(long)]
    agree_terms: bool,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    /// Change the given fields, keep the rest.
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

// ── Wiring ──

struct Backends {
    tables: Arc<dyn Backend>,
    storage: Arc<dyn ObjectStorage>,
    auth: Arc<dyn Authenticator>,
}

fn backends(cli: &Cli) -> anyhow::Result<Backends> {
    if cli.demo {
        info!("demo mode: in-memory store with sample animals");
        let tables =
            MemoryBackend::with_sample_animals().context("loading the sample animals")?;
        return Ok(Backends {
            tables: Arc::new(tables),
            storage: Arc::new(MemoryStorage::new(format!("memory://{}", cli.bucket))),
            auth: Arc::new(MemoryAuth::new()),
        });
    }
    let url = cli
        .url
        .clone()
        .context("--url (or PARAISO_URL) is required unless --demo is given")?;
    let anon_key = cli
        .anon_key
        .clone()
        .context("--anon-key (or PARAISO_ANON_KEY) is required unless --demo is given")?;
    let remote = Remote::connect(RemoteConfig::new(url, anon_key).with_bucket(&cli.bucket));
    Ok(Backends {
        tables: remote.tables,
        storage: remote.storage,
        auth: remote.auth,
    })
}

fn build_app(backends: Backends) -> App {
    App::new(
        backends.tables,
        backends.storage,
        backends.auth,
        Arc::new(ConsoleNotifier),
    )
}

/// Failures the user has already been told about through a notification
/// end the command quietly.
fn finished<T>(result: Result<T, AppError>) -> anyhow::Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(AppError::NotAuthenticated) => {
            eprintln!("Not signed in. Run `paraiso login` first.");
            Ok(false)
        }
        Err(e) => {
            debug!(error = %e, "command failed");
            Ok(false)
        }
    }
}

// ── Commands ──

async fn run(app: &App, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Animals {
            species,
            sex,
            status,
            search,
        } => {
            let criteria = FilterCriteria::from_raw(&species, &sex, &status, &search)?;
            let mut ctrl = app.controller();
            // Each edit may issue its own ticket; the explicit search supersedes them.
            let _ = ctrl.change(FilterChange::Species(criteria.species));
            let _ = ctrl.change(FilterChange::Sex(criteria.sex));
            let _ = ctrl.change(FilterChange::Status(criteria.status));
            let _ = ctrl.change(FilterChange::Search(criteria.search));
            let ticket = ctrl.search();
            eprint!("{}", display::render_catalog(ctrl.animals(), ctrl.loading()));
            ctrl.run(ticket).await;
            display::print_catalog(ctrl.animals(), ctrl.loading());
            Ok(true)
        }
        Command::Animal { id } => match app.catalog().get_animal(&id).await {
            Some(animal) => {
                display::print_animal_card(&animal);
                Ok(true)
            }
            None => {
                eprintln!("No animal with id {id}.");
                Ok(false)
            }
        },
        Command::Featured => {
            let animals = app.catalog().featured_animals(FEATURED_LIMIT).await;
            display::print_catalog(&animals, false);
            Ok(true)
        }
        Command::Adopt {
            id,
            name,
            email,
            phone,
            message,
        } => {
            let mut form = AdoptionForm {
                name,
                email,
                phone,
                message,
            };
            finished(app.submissions().submit_adoption(&id, &mut form).await)
        }
        Command::Report(args) => {
            let photos = load_photos(&args.photos).await;
            let mut form = ReportForm {
                animal_name: args.animal_name,
                species: Some(args.species),
                sex: args.sex,
                age: args.age,
                size: args.size,
                location: args.location,
                description: args.description,
                contact_name: args.contact_name,
                contact_phone: args.contact_phone,
                contact_email: args.contact_email,
                can_keep_temporarily: args.can_keep,
            };
            let result = app.submissions().submit_report(&mut form, photos).await;
            if let Ok(receipt) = &result {
                println!("{} photo(s) attached.", receipt.uploaded.len());
            }
            finished(result)
        }
        Command::Volunteer(args) => {
            let mut form = VolunteerForm {
                name: args.name,
                email: args.email,
                phone: args.phone,
                age: args.age,
                availability: args.availability,
                experience: args.experience,
                reason: args.reason,
                agree_terms: args.agree_terms,
            };
            finished(app.submissions().submit_volunteer(&mut form).await)
        }
        Command::Signup(creds) => {
            finished(app.session().sign_up(&creds.email, &creds.password).await)
        }
        Command::Login(creds) => {
            finished(app.session().sign_in(&creds.email, &creds.password).await)
        }
        Command::Logout => {
            if !app.session().is_signed_in() {
                println!("Not signed in.");
                return Ok(true);
            }
            app.session().sign_out().await.context("signing out")?;
            println!("Signed out.");
            Ok(true)
        }
        Command::Whoami => {
            print!("{}", display::render_whoami(app.session().current_user().as_ref()));
            Ok(true)
        }
        Command::Profile { action } => {
            let profile = app.profile();
            let overview = match profile.load().await {
                Ok(overview) => overview,
                Err(e) => return finished::<()>(Err(e)),
            };
            match action {
                ProfileAction::Show => {
                    display::print_profile(&overview);
                    Ok(true)
                }
                ProfileAction::Update {
                    first_name,
                    last_name,
                    phone,
                    email,
                } => {
                    let current = overview.profile;
                    let form = ProfileForm {
                        first_name: first_name.unwrap_or(current.first_name),
                        last_name: last_name.unwrap_or(current.last_name),
                        phone: phone.unwrap_or(current.phone),
                        email: email.unwrap_or(current.email),
                    };
                    finished(profile.update(&form).await)
                }
            }
        }
        Command::SetupStorage => {
            if app.setup_storage().await.context("setting up photo storage")? {
                println!("Created the photo bucket.");
            } else {
                println!("Photo bucket already exists.");
            }
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(demo = cli.demo, "paraiso v{}", env!("CARGO_PKG_VERSION"));

    let app = build_app(backends(&cli)?);
    // The in-memory auth forgets accounts between runs, so demo sessions are not kept.
    let persist = !cli.demo;
    if persist && let Some(session) = session_file::load(&cli.session_file)? {
        app.session().restore(session);
    }
    let before = app.session().current_session();

    let ok = run(&app, cli.command).await?;

    let after = app.session().current_session();
    if persist && after != before {
        session_file::sync(&cli.session_file, after.as_ref())?;
    }
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("paraiso").chain(args.iter().copied())).unwrap()
    }

    fn demo_app() -> App {
        build_app(backends(&parse(&["--demo", "whoami"])).unwrap())
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn animals_defaults_to_all() {
        let cli = parse(&["animals"]);
        match cli.command {
            Command::Animals {
                species,
                sex,
                status,
                search,
            } => {
                let criteria = FilterCriteria::from_raw(&species, &sex, &status, &search).unwrap();
                assert!(criteria.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_parses_enums_and_photos() {
        let cli = parse(&[
            "report",
            "--species",
            "cat",
            "--sex",
            "female",
            "--location",
            "Centro",
            "--description",
            "Hungry",
            "--contact-name",
            "Ana",
            "--contact-phone",
            "123",
            "--contact-email",
            "ana@example.org",
            "--can-keep",
            "maybe",
            "--photo",
            "a.jpg",
            "--photo",
            "b.jpg",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.species, Species::Cat);
        assert_eq!(args.sex, Some(Sex::Female));
        assert_eq!(args.can_keep, KeepOption::Maybe);
        assert_eq!(args.photos.len(), 2);
    }

    #[test]
    fn unknown_species_is_rejected() {
        let err = Cli::try_parse_from(["paraiso", "report", "--species", "dragon"]);
        assert!(err.is_err());
    }

    #[test]
    fn remote_mode_needs_url_and_key() {
        let mut cli = Cli::try_parse_from(["paraiso", "featured"]).unwrap();
        cli.url = None;
        cli.anon_key = None;
        let err = backends(&cli).err().unwrap();
        assert!(err.to_string().contains("--url"));

        cli.url = Some("https://project.example.co".into());
        let err = backends(&cli).err().unwrap();
        assert!(err.to_string().contains("--anon-key"));
    }

    #[test]
    fn bucket_defaults() {
        let cli = parse(&["--demo", "featured"]);
        assert_eq!(cli.bucket, DEFAULT_BUCKET);
    }

    #[tokio::test]
    async fn demo_adopt_then_animal_is_pending() {
        let app = demo_app();
        let adopt = parse(&[
            "adopt",
            "3",
            "--name",
            "Ana",
            "--email",
            "ana@example.org",
            "--phone",
            "123",
        ]);
        assert!(run(&app, adopt.command).await.unwrap());
        let again = parse(&[
            "adopt",
            "3",
            "--name",
            "Bia",
            "--email",
            "bia@example.org",
            "--phone",
            "456",
        ]);
        assert!(!run(&app, again.command).await.unwrap());
    }

    #[tokio::test]
    async fn demo_login_profile_logout() {
        let app = demo_app();
        let creds = ["--email", "ana@example.org", "--password", "secret1"];
        let signup: Vec<&str> = std::iter::once("signup").chain(creds).collect();
        let login: Vec<&str> = std::iter::once("login").chain(creds).collect();

        assert!(!run(&app, parse(&["profile", "show"]).command).await.unwrap());
        assert!(run(&app, parse(&signup).command).await.unwrap());
        assert!(run(&app, parse(&login).command).await.unwrap());
        assert!(
            run(&app, parse(&["profile", "update", "--first-name", "Ana"]).command)
                .await
                .unwrap()
        );
        let overview = app.profile().load().await.unwrap();
        assert_eq!(overview.profile.first_name, "Ana");
        assert!(run(&app, parse(&["logout"]).command).await.unwrap());
        assert!(!app.session().is_signed_in());
    }

    #[tokio::test]
    async fn demo_missing_animal_fails() {
        let app = demo_app();
        assert!(!run(&app, parse(&["animal", "999"]).command).await.unwrap());
        assert!(run(&app, parse(&["animal", "1"]).command).await.unwrap());
    }

    #[tokio::test]
    async fn bad_filter_value_is_an_error() {
        let app = demo_app();
        let result = run(&app, parse(&["animals", "--species", "dragon"]).command).await;
        assert!(result.is_err());
    }
}
