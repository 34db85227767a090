use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use funnel_core::copy::{self, CopyTone};
use funnel_llm::{ChatClient, CopyRequest, CopyWriter, LlmCopyWriter, LlmError};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum CopySubcommand {
    /// Render template copy from the current stage counts
    Render {
        /// professional, friendly or bold (default from config)
        #[arg(long)]
        tone: Option<String>,
        /// Also save the result as the project's copy
        #[arg(long)]
        save: bool,
    },
    /// Ask the language model to write copy from the mapped content
    Generate {
        /// Persona id to write for
        #[arg(long)]
        persona: Option<String>,
        #[arg(long)]
        tone: Option<String>,
        #[arg(long)]
        save: bool,
    },
    /// Print the saved copy
    Show,
    /// Save copy from a file, or from stdin when no file is given
    Save {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: CopySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CopySubcommand::Render { tone, save } => render(root, tone.as_deref(), save, json),
        CopySubcommand::Generate {
            persona,
            tone,
            save,
        } => generate(root, persona.as_deref(), tone.as_deref(), save, json),
        CopySubcommand::Show => show(root, json),
        CopySubcommand::Save { file } => save_from(root, file.as_deref(), json),
    }
}

fn resolve_tone(tone: Option<&str>, default: CopyTone) -> anyhow::Result<CopyTone> {
    Ok(match tone {
        Some(t) => t.parse()?,
        None => default,
    })
}

fn emit(text: &str, tone: CopyTone, saved: bool, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "tone": tone, "copy": text, "saved": saved }))
    } else {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
        if saved {
            eprintln!("(saved)");
        }
        Ok(())
    }
}

fn render(root: &Path, tone: Option<&str>, save: bool, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let tone = resolve_tone(tone, project.config.copy.tone)?;
    let ws = &project.workspace;
    let text = copy::render_with_tone(&ws.stage_counts(), ws.personas(), tone);
    if save {
        project.workspace.save_copy(text.clone())?;
    }
    emit(&text, tone, save, json)
}

fn generate(
    root: &Path,
    persona_id: Option<&str>,
    tone: Option<&str>,
    save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let tone = resolve_tone(tone, project.config.copy.tone)?;
    let persona = match persona_id {
        Some(id) => Some(
            project
                .workspace
                .persona(id)
                .ok_or_else(|| funnel_core::FunnelError::PersonaNotFound(id.to_string()))?,
        ),
        None => project.workspace.personas().first(),
    };
    let request = CopyRequest::new(project.workspace.stages(), persona, tone);

    let client = ChatClient::from_config(&project.config.llm)?;
    if !client.has_api_key() {
        anyhow::bail!(
            "no API key: set {} or use `funnel copy render`",
            project.config.llm.api_key_env
        );
    }
    let writer = LlmCopyWriter::new(client);
    let rt = tokio::runtime::Runtime::new()?;
    let text = rt.block_on(writer.write(&request)).map_err(|e| match e {
        LlmError::Upstream { status, body } => {
            anyhow::anyhow!("model API returned {status}: {body}")
        }
        other => anyhow::Error::from(other),
    })?;

    if save {
        project.workspace.save_copy(text.clone())?;
    }
    emit(&text, tone, save, json)
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let text = project.workspace.copy();
    if json {
        return print_json(&serde_json::json!({ "copy": text }));
    }
    if text.is_empty() {
        println!("No copy saved yet. Run `funnel copy render --save`.");
    } else {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn save_from(root: &Path, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read copy from stdin")?;
            buf
        }
    };
    let mut project = super::open(root)?;
    let bytes = text.len();
    project.workspace.save_copy(text)?;
    if json {
        print_json(&serde_json::json!({ "saved": true, "bytes": bytes }))?;
    } else {
        println!("Saved copy ({bytes} bytes)");
    }
    Ok(())
}
