//! Terminal stand-in for the formatting toolbar.
//!
//! Loads a document, replays a script of selections, key presses and button
//! presses against it, and prints the toolbar whenever the editor reports a
//! change.

mod render;
mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use plate_core::{Document, DocumentValue, Editor, Node, Point, Selection};
use plate_format::{ButtonPress, Dispatcher, ToolbarConfig};

use crate::render::{TerminalToolbar, render_document};
use crate::script::Step;

#[derive(Debug, Parser)]
#[command(name = "plate-format-story")]
#[command(about = "Replays formatting commands against a document")]
struct Cli {
    /// Document to load: a saved `DocumentValue` or a bare array of blocks
    #[arg(long)]
    document: Option<PathBuf>,

    /// Toolbar layout as JSON; defaults to the demo toolbar
    #[arg(long)]
    toolbar: Option<PathBuf>,

    /// Print the final document as JSON
    #[arg(long)]
    dump: bool,

    /// Steps such as `select 0.0:0 0.0:6`, `key ctrl+b`, `press block-quote`,
    /// `type hello`, `undo`, `redo`, `blur`
    #[arg(value_parser = script::parse_step)]
    steps: Vec<Step>,
}

fn load_document(path: Option<&PathBuf>) -> Result<Document> {
    let Some(path) = path else {
        return Ok(Document::new(vec![Node::paragraph(
            "A line of text in a paragraph.",
        )]));
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let value = DocumentValue::from_json_str(&json)
        .with_context(|| format!("failed to parse document {}", path.display()))?;
    Ok(value.into_document())
}

fn load_toolbar(path: Option<&PathBuf>) -> Result<ToolbarConfig> {
    let Some(path) = path else {
        return Ok(ToolbarConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read toolbar {}", path.display()))?;
    ToolbarConfig::from_json_str(&json)
        .with_context(|| format!("failed to parse toolbar {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let doc = load_document(cli.document.as_ref())?;
    let mut editor = Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))));
    let mut dispatcher = Dispatcher::new(load_toolbar(cli.toolbar.as_ref())?);
    let mut view = TerminalToolbar::default();

    dispatcher.refresh(&editor);
    view.print(dispatcher.state());
    println!("{}", render_document(&editor));

    for step in cli.steps {
        println!("> {step}");
        match step {
            Step::Select(selection) => editor.select(selection),
            Step::Blur => editor.deselect(),
            Step::Key(mut event) => {
                dispatcher
                    .on_key_down(&mut editor, &mut event)
                    .with_context(|| format!("key {:?} failed", event.key))?;
            }
            Step::Press(id) => {
                let mut press = ButtonPress::new(id);
                dispatcher
                    .on_button_press(&mut editor, &mut press)
                    .with_context(|| format!("toolbar button {} failed", press.id))?;
            }
            Step::Type(text) => editor.insert_text(&text).context("typing failed")?,
            Step::Undo => {
                if !editor.undo() {
                    log::info!("nothing to undo");
                }
            }
            Step::Redo => {
                if !editor.redo() {
                    log::info!("nothing to redo");
                }
            }
        }

        if dispatcher.sync(&mut editor, &mut view) {
            println!("{}", render_document(&editor));
        }
    }

    if cli.dump {
        let value = DocumentValue::new(editor.doc().clone());
        println!("{}", value.to_json_pretty()?);
    }

    Ok(())
}
