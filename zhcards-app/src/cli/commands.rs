use crate::api::routes::AppState;
use crate::api::server as api_server;
use crate::api::translate::{AzureTranslator, Translator};
use crate::cli::opts::*;
use crate::cli::study;

use anyhow::{anyhow, bail, Result};
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use zhcards_core::{
    CardPatch, CardRepository, NewCard, RepositoryState, SnapshotStore, StorageCodec,
    DEFAULT_SET_ID,
};
use zhcards_json::paths::data_root;
use zhcards_json::FileStore;
use zhcards_sqlite::SqliteSnapshotStore;

pub async fn run_cli(args: Cli) -> Result<()> {
    match args.cmd.clone() {
        Command::Api(api) => {
            let snapshots = open_snapshots(args.db_path.clone()).await?;
            let translator = AzureTranslator::from_opts(&api.translator)
                .map(|t| Arc::new(t) as Arc<dyn Translator>);
            let addr: std::net::SocketAddr = api.addr.parse()?;
            api_server::run(AppState { snapshots, translator }, addr).await
        }
        Command::Share(cmd) => {
            let snapshots = open_snapshots(args.db_path.clone()).await?;
            let mut repo = open_repo(&args);
            share_cmd(&mut repo, &*snapshots, cmd).await
        }
        Command::Set(cmd) => set_cmd(&mut open_repo(&args), cmd),
        Command::Card(cmd) => card_cmd(&mut open_repo(&args), cmd),
        Command::Study(cmd) => study_cmd(&open_repo(&args), cmd),
        Command::Export(cmd) => export_cmd(&open_repo(&args), cmd),
        Command::Import(cmd) => import_cmd(&mut open_repo(&args), cmd),
    }
}

/// Compose the repository over the file store. A store that cannot be opened
/// degrades to an in-memory session rather than failing the command.
pub fn open_repo(args: &Cli) -> CardRepository {
    if args.ephemeral {
        return CardRepository::open(StorageCodec::detached());
    }
    let store = match &args.data_dir {
        Some(dir) => FileStore::open_in(dir),
        None => FileStore::open_default(),
    };
    match store {
        Ok(s) => CardRepository::open(StorageCodec::new(Arc::new(s))),
        Err(e) => {
            warn!(error = %e, "card store unavailable, changes will not be saved");
            CardRepository::open(StorageCodec::detached())
        }
    }
}

pub async fn open_snapshots(db_path: Option<PathBuf>) -> Result<Arc<dyn SnapshotStore>> {
    let p = db_path.unwrap_or_else(|| data_root().join("share.sqlite3"));
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let s = SqliteSnapshotStore::open_file(&p).await?;
    Ok(Arc::new(s))
}

fn set_cmd(repo: &mut CardRepository, cmd: SetCmd) -> Result<()> {
    match cmd {
        SetCmd::Add { name } => {
            let id = repo.add_set(&name);
            println!("{id}");
        }
        SetCmd::List => {
            for s in repo.card_sets() {
                let mark = if s.id == repo.selected_set_id() { "*" } else { " " };
                println!("{mark} {}\t{}\tcards={}", s.id, s.name, s.cards.len());
            }
        }
        SetCmd::Rename { set, name } => {
            let id = resolve_set(repo, &set)?;
            repo.update_set(&id, &name);
            println!("ok");
        }
        SetCmd::Rm { set } => {
            let id = resolve_set(repo, &set)?;
            if id == DEFAULT_SET_ID {
                bail!("the default set cannot be deleted");
            }
            repo.delete_set(&id);
            println!("ok");
        }
        SetCmd::Select { set } => {
            let id = resolve_set(repo, &set)?;
            repo.set_selected_set_id(&id);
            println!("ok");
        }
    }
    Ok(())
}

fn card_cmd(repo: &mut CardRepository, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let set_id = resolve_set_or_selected(repo, a.set.as_deref())?;
            repo.add_card(&set_id, NewCard::new(a.chinese, a.pinyin, a.english));
            if let Some(c) = repo.cards_by_set(&set_id).last() {
                println!("{}", c.id);
            }
        }
        CardCmd::List { set } => {
            let set_id = resolve_set_or_selected(repo, set.as_deref())?;
            for c in repo.cards_by_set(&set_id) {
                println!("{}\t{}\t{}\t{}", c.id, c.chinese, c.pinyin, c.english);
            }
        }
        CardCmd::Rm { card_id, set } => {
            let set_id = resolve_set_or_selected(repo, set.as_deref())?;
            ensure_card(repo, &set_id, &card_id)?;
            repo.delete_card(&set_id, &card_id);
            println!("ok");
        }
        CardCmd::Edit(e) => {
            let set_id = resolve_set_or_selected(repo, e.set.as_deref())?;
            ensure_card(repo, &set_id, &e.card_id)?;
            let patch = CardPatch {
                chinese: e.chinese,
                pinyin: e.pinyin,
                english: e.english,
            };
            if patch.is_empty() {
                bail!("nothing to change: pass --chinese, --pinyin or --english");
            }
            repo.update_card(&set_id, &e.card_id, patch);
            println!("ok");
        }
        CardCmd::Reorder(r) => {
            let set_id = resolve_set_or_selected(repo, r.set.as_deref())?;
            if r.allow_drop {
                repo.reorder_cards(&set_id, &r.ids);
            } else {
                repo.try_reorder_cards(&set_id, &r.ids)?;
            }
            println!("ok");
        }
    }
    Ok(())
}

fn study_cmd(repo: &CardRepository, cmd: StudyCmd) -> Result<()> {
    let set_id = resolve_set_or_selected(repo, cmd.set.as_deref())?;
    let cards = match cmd.mode {
        StudyMode::Sequential => repo.cards_by_set(&set_id),
        StudyMode::Random => repo.random_order(&set_id),
    };
    study::present(&cards, cmd.max, stdin().lock(), &mut stdout())?;
    Ok(())
}

fn export_cmd(repo: &CardRepository, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path } => {
            let s = serde_json::to_string_pretty(repo.state())?;
            std::fs::write(&path, s)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path, set } => {
            let sets: Vec<_> = match set {
                Some(sel) => {
                    let id = resolve_set(repo, &sel)?;
                    repo.find_set(&id).into_iter().collect()
                }
                None => repo.card_sets().iter().collect(),
            };

            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["set", "chinese", "pinyin", "english"])?;
            for s in sets {
                for c in &s.cards {
                    wtr.write_record([s.name.as_str(), c.chinese.as_str(), c.pinyin.as_str(), c.english.as_str()])?;
                }
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn import_cmd(repo: &mut CardRepository, cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Json { path } => {
            let data = std::fs::read_to_string(&path)?;
            let bundle: RepositoryState = serde_json::from_str(&data)?;
            for set in bundle.sets {
                if set.is_default() {
                    for c in set.cards {
                        repo.add_card(DEFAULT_SET_ID, NewCard::new(c.chinese, c.pinyin, c.english));
                    }
                } else {
                    repo.import_set(set);
                }
            }
            println!("imported");
        }
        ImportCmd::Csv { path, set } => {
            let target = match set {
                Some(sel) => Some(resolve_set(repo, &sel)?),
                None => None,
            };
            let mut rdr = csv::Reader::from_path(&path)?;
            let mut count = 0usize;
            for rec in rdr.records() {
                let rec = rec?;
                let set_name = rec.get(0).unwrap_or("").trim();
                let fields = NewCard::new(
                    rec.get(1).unwrap_or(""),
                    rec.get(2).unwrap_or(""),
                    rec.get(3).unwrap_or(""),
                );
                let set_id = match &target {
                    Some(id) => id.clone(),
                    None => ensure_set_by_name(repo, set_name),
                };
                repo.add_card(&set_id, fields);
                count += 1;
            }
            println!("imported {count}");
        }
    }
    Ok(())
}

async fn share_cmd(repo: &mut CardRepository, snapshots: &dyn SnapshotStore, cmd: ShareCmd) -> Result<()> {
    match cmd {
        ShareCmd::Publish { set } => {
            let id = resolve_set(repo, &set)?;
            let payload = repo
                .share_payload(&id)
                .ok_or_else(|| anyhow!("set not found: {set}"))?;
            let snap = snapshots.insert(Some(payload)).await?;
            println!("{}", snap.id);
        }
        ShareCmd::Fetch { id } => {
            let snap = snapshots
                .get(&id)
                .await?
                .ok_or_else(|| anyhow!("shared set not found: {id}"))?;
            let set = snap.decode_set()?;
            let new_id = repo.import_set(set);
            println!("{new_id}");
        }
        ShareCmd::List => {
            for snap in snapshots.list().await? {
                let name = snap
                    .decode_set()
                    .map(|s| s.name)
                    .unwrap_or_else(|_| "-".to_string());
                println!("{}\t{}\t{}", snap.id, snap.timestamp.to_rfc3339(), name);
            }
        }
    }
    Ok(())
}

// ===== Helpers =====

/// Match a set by exact id first, then by case-insensitive name.
pub fn resolve_set(repo: &CardRepository, sel: &str) -> Result<String> {
    if let Some(s) = repo.find_set(sel) {
        return Ok(s.id.clone());
    }
    if let Some(s) = repo.card_sets().iter().find(|s| s.name.eq_ignore_ascii_case(sel)) {
        return Ok(s.id.clone());
    }
    bail!("set not found: {}", sel)
}

fn resolve_set_or_selected(repo: &CardRepository, sel: Option<&str>) -> Result<String> {
    match sel {
        Some(s) => resolve_set(repo, s),
        None => Ok(repo.selected_set_id().to_string()),
    }
}

fn ensure_set_by_name(repo: &mut CardRepository, name: &str) -> String {
    if name.is_empty() {
        return DEFAULT_SET_ID.to_string();
    }
    match resolve_set(repo, name) {
        Ok(id) => id,
        Err(_) => repo.add_set(name),
    }
}

fn ensure_card(repo: &CardRepository, set_id: &str, card_id: &str) -> Result<()> {
    let found = repo
        .find_set(set_id)
        .map(|s| s.card(card_id).is_some())
        .unwrap_or(false);
    if !found {
        bail!("card not found: {}", card_id);
    }
    Ok(())
}
