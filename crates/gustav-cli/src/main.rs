//! GUSTAV CLI: drive the upload flow and local preferences from a terminal.
//!
//! Reads GUSTAV_* variables (and `.env`). Set GUSTAV_SESSION_COOKIE to act as a
//! signed-in user.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gustav_api_client::{ApiClient, UploadPreparer};
use gustav_cli::{init_tracing, load_upload_file, parse_fields};
use gustav_core::{ClientConfig, FormMode, UploadPolicy};
use gustav_forms::{
    FilePreferenceStore, FormContext, FormController, NotificationCenter, Settings, SubmitOutcome,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "gustav", about = "GUSTAV upload and preferences CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and upload a file, print the values for the hidden fields
    Prepare {
        /// Path to the file to upload
        file: PathBuf,
        /// Declared MIME type (guessed from the extension otherwise)
        #[arg(long)]
        mime: Option<String>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Submit a form, uploading the file first when in upload mode
    Submit {
        /// Form action URL
        action: String,
        /// File for upload mode
        #[arg(long)]
        file: Option<PathBuf>,
        /// Declared MIME type (guessed from the extension otherwise)
        #[arg(long)]
        mime: Option<String>,
        /// Form mode: text or upload (image and file are accepted as upload)
        #[arg(long, default_value = "upload")]
        mode: String,
        /// Visible form field as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Compute the local digest of a file
    Digest {
        /// Path to the file
        file: PathBuf,
    },
    /// Colour theme preference
    Theme {
        #[command(subcommand)]
        sub: ThemeCommands,
    },
    /// Sidebar preference
    Sidebar {
        #[command(subcommand)]
        sub: SidebarCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Show the active theme
    Get {
        /// Whether the system prefers a dark scheme
        #[arg(long)]
        system_dark: bool,
    },
    /// Save a theme: rose-pine-dawn or everforest-dark-hard
    Set { name: String },
    /// Switch between the light and dark theme
    Toggle {
        #[arg(long)]
        system_dark: bool,
    },
}

#[derive(Subcommand)]
enum SidebarCommands {
    /// Show whether the sidebar is collapsed
    Get,
    /// Collapse or expand the sidebar
    Toggle,
}

/// Which form the upload belongs to. `--intent-url` selects material creation;
/// otherwise course and task ids select a learning submission.
#[derive(Args)]
struct FormArgs {
    #[arg(long)]
    course_id: Option<String>,
    #[arg(long)]
    task_id: Option<String>,
    /// Intent endpoint of a material form
    #[arg(long)]
    intent_url: Option<String>,
    /// Comma-separated MIME allow-list of a material form
    #[arg(long, default_value = "")]
    allowed_mime: String,
    /// Byte ceiling of a material form (0 disables it)
    #[arg(long, default_value = "0")]
    max_bytes: String,
}

impl FormArgs {
    fn context(&self) -> FormContext {
        match &self.intent_url {
            Some(url) => FormContext::MaterialCreate {
                intent_url: Some(url.clone()),
                policy: UploadPolicy::from_attributes(&self.allowed_mime, &self.max_bytes),
            },
            None => FormContext::LearningSubmission {
                course_id: self.course_id.clone().unwrap_or_default(),
                task_id: self.task_id.clone().unwrap_or_default(),
            },
        }
    }
}

#[derive(Serialize)]
struct SubmitReport {
    status: u16,
    prepared_now: bool,
    fields: Vec<(String, String)>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn settings(
    config: &ClientConfig,
    system_dark: bool,
) -> anyhow::Result<Settings<FilePreferenceStore>> {
    Settings::init(
        FilePreferenceStore::new(&config.preferences_path),
        system_dark,
    )
    .with_context(|| {
        format!(
            "Failed to load preferences from {}",
            config.preferences_path.display()
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env().context("Failed to load GUSTAV_* configuration")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare { file, mime, form } => {
            let api = ApiClient::from_config(&config)?;
            let preparer = UploadPreparer::new(api, &config.digest_algorithm);

            let context = form.context();
            let file = load_upload_file(&file, mime.as_deref()).await?;
            let endpoint = context.intent_endpoint()?;
            let outcome = preparer
                .prepare(
                    &endpoint,
                    &file,
                    context.policy(&config.learning_policy),
                    &context.payload(&file),
                )
                .await?;
            print_json(&outcome)?;
        }
        Commands::Submit {
            action,
            file,
            mime,
            mode,
            fields,
            form,
        } => {
            let api = ApiClient::from_config(&config)?;
            let preparer = UploadPreparer::new(api.clone(), &config.digest_algorithm);
            let mut notifications = NotificationCenter::new();

            let mut controller =
                FormController::new(form.context(), action, &config.learning_policy)
                    .with_mode(FormMode::parse(&mode));
            for (name, value) in parse_fields(&fields)? {
                controller.set_field(name, value);
            }
            if let Some(path) = file {
                controller.select_file(Some(load_upload_file(&path, mime.as_deref()).await?));
            }

            let result = controller
                .submit(&preparer, &api, &mut notifications)
                .await;
            if let Some(notice) = notifications.last() {
                eprintln!("[{:?}] {}", notice.level, notice.message);
            }

            match result? {
                SubmitOutcome::Submitted {
                    status,
                    prepared_now,
                } => print_json(&SubmitReport {
                    status,
                    prepared_now,
                    fields: controller.submission_fields(),
                })?,
                SubmitOutcome::Ignored => {
                    tracing::warn!("Submit ignored");
                }
            }
        }
        Commands::Digest { file } => {
            let api = ApiClient::from_config(&config)?;
            let preparer = UploadPreparer::new(api, &config.digest_algorithm);
            let file = load_upload_file(&file, None).await?;
            let digest = preparer.compute_digest(&file)?;
            print_json(&serde_json::json!({
                "algorithm": config.digest_algorithm,
                "sha256": digest,
                "size_bytes": file.size,
            }))?;
        }
        Commands::Theme { sub } => match sub {
            ThemeCommands::Get { system_dark } => {
                let settings = settings(&config, system_dark)?;
                print_json(&serde_json::json!({
                    "theme": settings.theme().as_str(),
                    "saved": settings.has_saved_theme(),
                }))?;
            }
            ThemeCommands::Set { name } => {
                let mut settings = settings(&config, false)?;
                if !settings.set_theme(&name)? {
                    anyhow::bail!(
                        "Unknown theme '{}'. Use rose-pine-dawn or everforest-dark-hard",
                        name
                    );
                }
                print_json(&serde_json::json!({ "theme": settings.theme().as_str() }))?;
            }
            ThemeCommands::Toggle { system_dark } => {
                let mut settings = settings(&config, system_dark)?;
                let theme = settings.toggle_theme()?;
                print_json(&serde_json::json!({ "theme": theme.as_str() }))?;
            }
        },
        Commands::Sidebar { sub } => {
            let mut settings = settings(&config, false)?;
            let collapsed = match sub {
                SidebarCommands::Get => settings.sidebar_collapsed(),
                SidebarCommands::Toggle => settings.toggle_sidebar()?,
            };
            print_json(&serde_json::json!({ "collapsed": collapsed }))?;
        }
    }

    Ok(())
}
