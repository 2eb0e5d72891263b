use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{Editor, EditorSession, HttpNotes, LocalNotes, NoteApi};
use crate::config::Config;
use crate::entity::NoteTree;
use crate::error::{NotesError, Result};
use crate::search::filter_notes;
use crate::server;
use crate::storage::NoteStore;

/// Resolve configuration: file, then environment, then `--root`.
pub fn load_config(path: Option<&Path>, root: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load(path)?;
    if let Some(root) = root {
        config.root = root;
    }
    Ok(config)
}

fn open_store(config: &Config) -> Result<NoteStore> {
    NoteStore::new(&config.root, config.list)
}

/// Cancel the returned token on ctrl-c.
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            trigger.cancel();
        }
    });
    token
}

pub fn handle_serve(mut config: Config, bind: Option<String>, static_dir: Option<PathBuf>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(dir) = static_dir {
        config.static_dir = Some(dir);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let shutdown = shutdown_on_ctrl_c();
        server::serve(config, shutdown).await
    })
}

pub fn handle_save(config: Config, name: String, content: Option<String>, stdin: bool) -> Result<()> {
    let store = open_store(&config)?;

    let content = if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        content.unwrap_or_default()
    };

    let saved = store.save(&name, &content)?;
    println!("Saved note {}", saved);
    Ok(())
}

pub fn handle_open(config: Config, name: String) -> Result<()> {
    let store = open_store(&config)?;
    print!("{}", store.open(&name)?);
    Ok(())
}

pub fn handle_delete(config: Config, name: String) -> Result<()> {
    let store = open_store(&config)?;
    store.delete(&name)?;
    println!("Deleted note {}", name);
    Ok(())
}

pub fn handle_rename(config: Config, old_name: String, new_name: String) -> Result<()> {
    let store = open_store(&config)?;
    let renamed = store.rename(&old_name, &new_name)?;
    println!("Renamed {} -> {}", old_name, renamed);
    Ok(())
}

pub fn handle_list(config: Config, tree: bool, json: bool) -> Result<()> {
    let store = open_store(&config)?;
    let names = store.list_names()?;

    if tree {
        let tree = NoteTree::from_names(&names);
        if json {
            println!("{}", serde_json::to_string_pretty(&tree)?);
        } else if names.is_empty() {
            println!("No notes found.");
        } else {
            print!("{}", tree.render());
        }
    } else if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        println!("No notes found.");
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

pub fn handle_search(config: Config, query: String, json: bool) -> Result<()> {
    let store = open_store(&config)?;
    let matches = filter_notes(store.list_with_content()?, &query);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else if matches.is_empty() {
        println!("No notes found.");
    } else {
        for entry in matches {
            match entry.content.text() {
                Some(_) => println!("{}", entry.name),
                None => println!("{} (unreadable)", entry.name),
            }
        }
    }

    Ok(())
}

pub fn handle_upload(config: Config, file: PathBuf, json: bool) -> Result<()> {
    let local = LocalNotes::from_config(&config)?;
    let bytes = std::fs::read(&file)?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let attachment = local.attachments.store(&file_name, &bytes)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&attachment)?);
    } else {
        println!("{}", attachment.url);
    }
    Ok(())
}

pub fn handle_sync(
    config: Config,
    server: Option<String>,
    name: String,
    file: PathBuf,
    interval: Option<u64>,
) -> Result<()> {
    let period = match interval {
        Some(0) => {
            return Err(NotesError::Config(
                "--interval must be positive".to_string(),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
        None => config.autosave_interval(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        match server {
            Some(url) => sync_file(Editor::new(HttpNotes::new(&url)), &name, &file, period).await,
            None => {
                let local = LocalNotes::from_config(&config)?;
                sync_file(Editor::new(local), &name, &file, period).await
            }
        }
    })
}

fn read_into(session: &mut EditorSession, file: &Path) {
    match std::fs::read_to_string(file) {
        Ok(text) => session.edit_content(text),
        Err(e) => warn!(file = %file.display(), error = %e, "cannot read synced file"),
    }
}

async fn sync_file<A: NoteApi>(editor: Editor<A>, name: &str, file: &Path, period: Duration) -> Result<()> {
    match editor.open(name).await {
        Ok(()) => {}
        Err(NotesError::NotFound(_)) => editor.with_session(|s| s.set_name(name)),
        Err(e) => return Err(e),
    }
    info!(note = %name, file = %file.display(), every = ?period, "syncing");

    let cancel = shutdown_on_ctrl_c();
    editor
        .run_autosave_with(period, cancel, |session| read_into(session, file))
        .await;

    editor.with_session(|session| read_into(session, file));
    editor.save().await?;
    Ok(())
}
