//! Watchlist store: one ordered, per-identity list of saved movies, persisted
//! as a plain-text file with `movieId||title||posterUrl` lines.

use crate::model::{Identity, WatchlistEntry};
use crate::store::DataDir;
use log::warn;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR: &str = "||";

#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    Duplicate,
}

pub struct WatchlistStore {
    dir: DataDir,
}

impl WatchlistStore {
    pub fn new(dir: DataDir) -> Self {
        WatchlistStore { dir }
    }

    fn file(&self, identity: &Identity) -> PathBuf {
        self.dir.watchlist_file(identity.file_stem())
    }

    /// Reads the identity's persisted list. A missing file is an empty list;
    /// malformed lines are skipped, not a load failure.
    pub fn load(&self, identity: &Identity) -> Vec<WatchlistEntry> {
        let path = self.file(identity);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not read {}: {}", path.display(), err);
                }
                return Vec::new();
            }
        };
        content.lines().filter_map(parse_line).collect()
    }

    fn persist(&self, identity: &Identity, entries: &[WatchlistEntry]) {
        let path = self.file(identity);
        let result = fs::File::create(&path).and_then(|mut file| {
            for entry in entries {
                writeln!(
                    file,
                    "{}{sep}{}{sep}{}",
                    entry.movie_id,
                    entry.title,
                    entry.poster_url,
                    sep = SEPARATOR
                )?;
            }
            Ok(())
        });
        if let Err(err) = result {
            warn!("could not persist {}: {}", path.display(), err);
        }
    }

    /// Appends an entry unless one with the same movie id is already present.
    pub fn add(&self, identity: &Identity, entry: WatchlistEntry) -> AddOutcome {
        let mut entries = self.load(identity);
        if entries.iter().any(|e| e.movie_id == entry.movie_id) {
            return AddOutcome::Duplicate;
        }
        entries.push(entry);
        self.persist(identity, &entries);
        AddOutcome::Accepted
    }

    /// Removes and returns the entry at `index`, or `None` if out of range.
    pub fn remove(&self, identity: &Identity, index: usize) -> Option<WatchlistEntry> {
        let mut entries = self.load(identity);
        if index >= entries.len() {
            return None;
        }
        let removed = entries.remove(index);
        self.persist(identity, &entries);
        Some(removed)
    }

    pub fn clear(&self, identity: &Identity) {
        self.persist(identity, &[]);
    }
}

fn parse_line(line: &str) -> Option<WatchlistEntry> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    let &[id, title, poster_url] = fields.as_slice() else {
        warn!("skipping malformed watchlist entry: {}", line);
        return None;
    };
    let movie_id = match id.parse() {
        Ok(movie_id) => movie_id,
        Err(_) => {
            warn!("skipping malformed watchlist entry: {}", line);
            return None;
        }
    };
    Some(WatchlistEntry {
        movie_id,
        title: title.to_owned(),
        poster_url: poster_url.to_owned(),
    })
}
