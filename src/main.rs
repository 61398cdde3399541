use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use cms_admin::api::ApiClient;
use cms_admin::auth::forms::{CreateAdminForm, ForgotPasswordForm, OtpForm, ResetPasswordForm};
use cms_admin::auth::{DemoVerifier, FileStorage, Session};
use cms_admin::config::Config;
use cms_admin::entities::{
    ContactDraft, EntityDraft, EntityKind, FaqDraft, GalleryDraft, HeroDraft, NewsDraft,
    OpportunityDraft,
};
use cms_admin::form::{EntityForm, ListCache, SubmitOutcome};
use cms_admin::i18n::UiStrings;
use cms_admin::image::{ImageResolver, LocalFile, ObjectUrlStore};
use cms_admin::routes::{guard, Access, Route};

#[derive(Parser, Debug)]
#[command(name = "cms-admin", about = "Manage CMS content from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List records of an entity (news, gallery, opportunities, faq, contact, hero)
    List { entity: String },
    Show { entity: String, id: String },
    Delete { entity: String, id: String },
    /// Create a record, or update it when --id is given
    Submit {
        entity: String,
        /// Record JSON in the backend's shape, e.g. {"title":{"uz":"..."}};
        /// with --id only the given fields change
        #[arg(long)]
        draft: String,
        #[arg(long)]
        id: Option<String>,
        /// Local image to upload in place of the draft's image URL
        #[arg(long)]
        image: Option<PathBuf>,
    },
    CreateAdmin {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    ForgotPassword { email: String },
    /// Check the emailed code before choosing a new password
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file when present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cms_admin=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = Arc::new(FileStorage::new(config.auth_storage_path.clone()));
    let mut session = Session::new(storage, Arc::new(DemoVerifier));
    session.restore()?;

    run(cli.command, &config, &mut session).await
}

async fn run(command: Command, config: &Config, session: &mut Session) -> Result<()> {
    let api = ApiClient::new(config).with_token(session.token());
    let images = ImageResolver::new(&config.api_url, Arc::new(ObjectUrlStore::new()));
    let mut cache = ListCache::new();

    match command {
        Command::Login { email, password } => {
            let user = session.login(&email, &password)?;
            println!("Logged in as {} ({})", user.email, user.role);
        }
        Command::Logout => {
            session.logout()?;
            println!("{}", UiStrings::lookup(&config.locale, "Logout"));
        }
        Command::Whoami => {
            require(session, &Route::Dashboard)?;
            if let Some(user) = session.current_user() {
                println!("{}", UiStrings::lookup(&config.locale, "Welcome"));
                println!("{} <{}> {}", full_name(user), user.email, user.role);
            }
        }
        Command::List { entity } => {
            let kind: EntityKind = entity.parse()?;
            require(session, &Route::List(kind))?;
            let list = cache.get_or_fetch(&api, kind).await?;
            println!("{}", serde_json::to_string_pretty(list)?);
        }
        Command::Show { entity, id } => {
            let kind: EntityKind = entity.parse()?;
            require(session, &Route::Edit(kind, id.clone()))?;
            let record: serde_json::Value = api.fetch(kind, &id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Delete { entity, id } => {
            let kind: EntityKind = entity.parse()?;
            require(session, &Route::Edit(kind, id.clone()))?;
            api.delete(kind, &id).await?;
            cache.invalidate(kind);
            println!("Deleted {} {}", kind, id);
        }
        Command::Submit {
            entity,
            draft,
            id,
            image,
        } => {
            let kind: EntityKind = entity.parse()?;
            let route = match &id {
                Some(id) => Route::Edit(kind, id.clone()),
                None => Route::New(kind),
            };
            require(session, &route)?;

            let draft: serde_json::Value =
                serde_json::from_str(&draft).context("--draft is not valid JSON")?;
            let image = match image {
                Some(path) => Some(
                    LocalFile::from_path(&path)
                        .with_context(|| format!("Failed to read image {}", path.display()))?,
                ),
                None => None,
            };
            let target = Submission {
                api: &api,
                images: &images,
                id: id.as_deref(),
                draft,
                image,
            };

            let next = match kind {
                EntityKind::News => target.run::<NewsDraft>(&mut cache).await?,
                EntityKind::Gallery => target.run::<GalleryDraft>(&mut cache).await?,
                EntityKind::Opportunities => target.run::<OpportunityDraft>(&mut cache).await?,
                EntityKind::Faq => target.run::<FaqDraft>(&mut cache).await?,
                EntityKind::Contact => target.run::<ContactDraft>(&mut cache).await?,
                EntityKind::Hero => target.run::<HeroDraft>(&mut cache).await?,
            };
            println!("Saved. Back to {}", next);
        }
        Command::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            require(session, &Route::CreateAdmin)?;
            let request = CreateAdminForm {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
            }
            .into_request()?;
            api.create_admin(&request).await?;
            println!("Admin {} created", request.email);
        }
        Command::ForgotPassword { email } => {
            require(session, &Route::ForgotPassword)?;
            ForgotPasswordForm {
                email: email.clone(),
            }
            .validate()?;
            api.forgot_password(&email).await?;
            println!("A code was sent to {}", email);
        }
        Command::VerifyOtp { email, otp } => {
            require(session, &Route::VerifyOtp)?;
            OtpForm { otp: otp.clone() }.validate()?;
            println!(
                "Code accepted. Next: cms-admin reset-password --email {} --otp {} \
                 --new-password <NEW> --confirm-password <NEW>",
                email, otp
            );
        }
        Command::ResetPassword {
            email,
            otp,
            new_password,
            confirm_password,
        } => {
            require(session, &Route::ResetPassword)?;
            let request = ResetPasswordForm {
                email,
                otp,
                new_password,
                confirm_password,
            }
            .into_request()?;
            api.verify_otp(&request).await?;
            println!("Password updated, log in again");
        }
    }

    Ok(())
}

fn require(session: &Session, route: &Route) -> Result<()> {
    match guard(session, route) {
        Access::Granted => Ok(()),
        Access::Redirect(Route::Login) => bail!("Not logged in; run `cms-admin login` first"),
        Access::Redirect(to) => bail!("Not allowed to open {}; redirected to {}", route, to),
    }
}

fn full_name(user: &cms_admin::auth::User) -> String {
    [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `submit` invocation, generic over the entity draft.
struct Submission<'a> {
    api: &'a ApiClient,
    images: &'a ImageResolver,
    id: Option<&'a str>,
    draft: serde_json::Value,
    image: Option<LocalFile>,
}

impl Submission<'_> {
    async fn run<D: EntityDraft>(self, cache: &mut ListCache) -> Result<Route> {
        let mut form = match self.id {
            Some(id) => {
                // Fields missing from --draft keep their stored values
                let mut form = EntityForm::<D>::new_edit(id, self.images.clone());
                form.load_with(self.api, Some(&self.draft)).await?;
                if let Some(message) = form.last_error() {
                    bail!("Failed to load {} {}: {}", D::KIND, id, message);
                }
                form
            }
            None => {
                let record: D::Record = serde_json::from_value(self.draft)
                    .with_context(|| format!("--draft does not describe a {} record", D::KIND))?;
                let mut form = EntityForm::<D>::new_create(self.images.clone());
                *form.draft_mut() = D::from_record(record, self.images);
                form
            }
        };

        if let Some(file) = self.image {
            info!("Attaching {} ({} bytes)", file.file_name, file.byte_len());
            form.draft_mut().attach_image(file);
        }

        match form.submit(self.api, cache).await? {
            SubmitOutcome::Saved(route) => Ok(route),
            SubmitOutcome::Invalid(errors) => {
                for error in &errors.errors {
                    eprintln!("  {}", error);
                }
                bail!("{}", errors)
            }
            SubmitOutcome::Failed(message) => bail!(message),
        }
    }
}
