use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use hoard_dag::{enumerate_children, import_bytes, DagService, NodeGetter};
use hoard_gc::Collector;
use hoard_pin::{InMemoryPinner, PinMode, Pinner};
use hoard_store::{BlockStore, FsBlockStore};
use hoard_types::Cid;

use crate::config::{RepoConfig, CONFIG_FILE};

/// File holding the cid of the current pin-set root.
const PINS_FILE: &str = "pins";

/// Counts reported by `hoard stat`.
#[derive(Debug, PartialEq, Eq)]
pub struct RepoStat {
    pub blocks: usize,
    pub recursive_pins: usize,
    pub direct_pins: usize,
}

/// An opened repository: a filesystem block store plus its pin registry.
pub struct Repo {
    root: PathBuf,
    store: Arc<FsBlockStore>,
    pinner: Arc<InMemoryPinner>,
    config: RepoConfig,
}

impl Repo {
    /// Create the repository layout at `root` with default settings.
    pub fn init(root: &Path) -> anyhow::Result<Self> {
        if root.join(CONFIG_FILE).exists() {
            bail!("{} is already a hoard repository", root.display());
        }
        fs::create_dir_all(root).with_context(|| format!("creating {}", root.display()))?;

        let config = RepoConfig::default();
        config.save(root)?;
        let store = Arc::new(FsBlockStore::open(root).context("opening block store")?);
        let repo = Self {
            root: root.to_path_buf(),
            store,
            pinner: Arc::new(InMemoryPinner::new()),
            config,
        };
        repo.save_pins()?;
        info!(path = %root.display(), "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository and load its pins.
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        if !root.join(CONFIG_FILE).exists() {
            bail!(
                "{} is not a hoard repository (run `hoard init` first)",
                root.display()
            );
        }
        let config = RepoConfig::load(root)?;
        let store = Arc::new(FsBlockStore::open(root).context("opening block store")?);

        let pins_path = root.join(PINS_FILE);
        let pinner = match fs::read_to_string(&pins_path) {
            Ok(text) => {
                let pin_root: Cid = text
                    .trim()
                    .parse()
                    .with_context(|| format!("parsing {}", pins_path.display()))?;
                let dag = DagService::offline(Arc::clone(&store));
                InMemoryPinner::load(&dag, &pin_root).context("loading pin set")?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => InMemoryPinner::new(),
            Err(e) => return Err(e).with_context(|| format!("reading {}", pins_path.display())),
        };

        Ok(Self {
            root: root.to_path_buf(),
            store,
            pinner: Arc::new(pinner),
            config,
        })
    }

    pub fn dag(&self) -> DagService<FsBlockStore> {
        DagService::offline(Arc::clone(&self.store))
    }

    /// A collector over this repository's store and pins.
    pub fn collector(&self) -> Collector<FsBlockStore, InMemoryPinner> {
        Collector::new(Arc::clone(&self.store), Arc::clone(&self.pinner))
            .with_config(self.config.gc.clone())
    }

    /// Import `data`, optionally pinning the result recursively.
    pub async fn add(&self, data: &[u8], pin: bool) -> anyhow::Result<Cid> {
        let _guard = self.store.locker().pin_lock().await;
        let cid = import_bytes(&self.dag(), data, self.config.import.chunk_size)
            .context("importing data")?;
        if pin {
            self.pinner.pin(cid, PinMode::Recursive)?;
            self.save_pins()?;
        }
        Ok(cid)
    }

    /// Pin `cid`. The blocks the pin will protect must already be stored.
    pub async fn pin(&self, cid: Cid, mode: PinMode) -> anyhow::Result<()> {
        let _guard = self.store.locker().pin_lock().await;
        let dag = self.dag();
        let node = dag
            .get(&cid)
            .with_context(|| format!("cannot pin {cid}"))?;
        if mode == PinMode::Recursive {
            let mut seen = HashSet::new();
            enumerate_children(&dag, &node, |child| seen.insert(*child), false)
                .with_context(|| format!("cannot pin {cid}: its DAG is incomplete"))?;
        }
        self.pinner.pin(cid, mode)?;
        self.save_pins()?;
        Ok(())
    }

    pub async fn unpin(&self, cid: &Cid) -> anyhow::Result<PinMode> {
        let _guard = self.store.locker().pin_lock().await;
        let mode = self.pinner.unpin(cid)?;
        self.save_pins()?;
        Ok(mode)
    }

    /// Every pin, recursive ones first.
    pub fn pins(&self) -> anyhow::Result<Vec<(Cid, PinMode)>> {
        let mut pins: Vec<(Cid, PinMode)> = self
            .pinner
            .recursive_keys()?
            .into_iter()
            .map(|cid| (cid, PinMode::Recursive))
            .collect();
        pins.extend(
            self.pinner
                .direct_keys()?
                .into_iter()
                .map(|cid| (cid, PinMode::Direct)),
        );
        Ok(pins)
    }

    pub fn stat(&self) -> anyhow::Result<RepoStat> {
        let mut blocks = 0;
        for key in self.store.all_keys()? {
            key?;
            blocks += 1;
        }
        Ok(RepoStat {
            blocks,
            recursive_pins: self.pinner.recursive_keys()?.len(),
            direct_pins: self.pinner.direct_keys()?.len(),
        })
    }

    /// Write the pin set into the store and record its root.
    fn save_pins(&self) -> anyhow::Result<Cid> {
        let root = self.pinner.flush(&self.dag()).context("flushing pin set")?;

        let mut file = NamedTempFile::new_in(&self.root).context("creating pins file")?;
        writeln!(file, "{root}")?;
        file.as_file().sync_all()?;
        file.persist(self.root.join(PINS_FILE))
            .map_err(|e| e.error)
            .context("writing pins file")?;

        debug!(root = %root, "saved pin set");
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use hoard_gc::CancellationToken;

    use super::*;

    fn repo() -> (tempfile::TempDir, Repo) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();
        (dir, repo)
    }

    async fn gc(repo: &Repo, best_effort: &[Cid]) -> usize {
        repo.collector()
            .collect(CancellationToken::new(), best_effort)
            .await
            .unwrap()
            .collect_keys()
            .await
            .unwrap()
            .len()
    }

    #[test]
    fn init_twice_fails() {
        let (dir, _repo) = repo();
        assert!(Repo::init(&dir.path().join("repo")).is_err());
    }

    #[test]
    fn open_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Repo::open(dir.path()).is_err());
    }

    #[tokio::test]
    async fn pins_survive_reopen() {
        let (dir, repo) = repo();
        let cid = repo.add(b"hello", true).await.unwrap();
        drop(repo);

        let reopened = Repo::open(&dir.path().join("repo")).unwrap();
        assert_eq!(reopened.pins().unwrap(), vec![(cid, PinMode::Recursive)]);
    }

    #[tokio::test]
    async fn gc_keeps_pinned_and_removes_unpinned() {
        let (_dir, repo) = repo();
        let kept = repo.add(b"keep me", true).await.unwrap();
        let dropped = repo.add(b"drop me", false).await.unwrap();

        gc(&repo, &[]).await;
        assert!(repo.store.has(&kept.key()).unwrap());
        assert!(!repo.store.has(&dropped.key()).unwrap());
    }

    #[tokio::test]
    async fn gc_removes_stale_pin_sets() {
        let (dir, repo) = repo();
        repo.add(b"one", true).await.unwrap();
        repo.add(b"two", true).await.unwrap();

        // Each save wrote a new pin-set root; only the latest is internal.
        assert!(gc(&repo, &[]).await > 0);
        assert_eq!(gc(&repo, &[]).await, 0);

        let reopened = Repo::open(&dir.path().join("repo")).unwrap();
        assert_eq!(reopened.pins().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn chunked_file_survives_gc_when_pinned() {
        let (_dir, mut repo) = repo();
        repo.config.import.chunk_size = 4;
        let cid = repo.add(b"0123456789abcdef", true).await.unwrap();
        gc(&repo, &[]).await;

        assert_eq!(repo.stat().unwrap().recursive_pins, 1);
        assert_eq!(repo.dag().get(&cid).unwrap().links.len(), 4);
        for link in repo.dag().get(&cid).unwrap().links {
            assert!(repo.store.has(&link.cid.key()).unwrap());
        }
    }

    #[tokio::test]
    async fn best_effort_root_is_kept_for_one_pass() {
        let (_dir, repo) = repo();
        let loose = repo.add(b"loose", false).await.unwrap();

        assert_eq!(gc(&repo, &[loose]).await, 0);
        assert!(repo.store.has(&loose.key()).unwrap());
        assert_eq!(gc(&repo, &[]).await, 1);
    }

    #[tokio::test]
    async fn pin_requires_present_blocks() {
        let (_dir, repo) = repo();
        let absent = Cid::for_data(hoard_types::Codec::Raw, b"absent");
        assert!(repo.pin(absent, PinMode::Direct).await.is_err());
    }

    #[tokio::test]
    async fn unpin_then_gc_removes_content() {
        let (_dir, repo) = repo();
        let cid = repo.add(b"temporary", true).await.unwrap();
        assert_eq!(repo.unpin(&cid).await.unwrap(), PinMode::Recursive);

        gc(&repo, &[]).await;
        assert!(!repo.store.has(&cid.key()).unwrap());
    }

    #[tokio::test]
    async fn stat_counts_blocks_and_pins() {
        let (_dir, repo) = repo();
        let a = repo.add(b"a", false).await.unwrap();
        repo.pin(a, PinMode::Direct).await.unwrap();
        gc(&repo, &[]).await;

        let stat = repo.stat().unwrap();
        assert_eq!(stat.direct_pins, 1);
        assert_eq!(stat.recursive_pins, 0);
        // `a`, the pin-set root and its two set nodes.
        assert_eq!(stat.blocks, 4);
    }
}
