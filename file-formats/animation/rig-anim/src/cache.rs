//! Reference-counted clip cache.
//!
//! Clips live in a generational arena keyed by [`ResourceId`]. A request
//! loads the clip on first use and hands out a [`ClipGuard`]; dropping the
//! guard releases the reference, and the clip is evicted when the last one
//! goes. Every request is therefore paired with exactly one release.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bytes::Bytes;
use generational_arena::{Arena, Index};
use log::{debug, warn};

use crate::clip::AnimationClip;
use crate::codec::{decode_clip, encode_clip};
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;

/// File extension used by [`DirectorySource`]
pub const CLIP_EXTENSION: &str = "clip";

/// Lookup of loaded clips by identifier
pub trait ClipProvider {
    fn clip(&self, uid: ResourceId) -> Option<&AnimationClip>;
}

impl<S: BuildHasher> ClipProvider for HashMap<ResourceId, AnimationClip, S> {
    fn clip(&self, uid: ResourceId) -> Option<&AnimationClip> {
        self.get(&uid)
    }
}

impl ClipProvider for BTreeMap<ResourceId, AnimationClip> {
    fn clip(&self, uid: ResourceId) -> Option<&AnimationClip> {
        self.get(&uid)
    }
}

/// Encoded clip payload together with its display name
#[derive(Debug, Clone)]
pub struct ClipBytes {
    pub name: String,
    pub data: Bytes,
}

/// Supplier of encoded clip data
pub trait ClipSource {
    fn fetch(&self, uid: ResourceId) -> Result<ClipBytes>;
}

/// Reads `<root>/<uid>.clip`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, uid: ResourceId) -> PathBuf {
        self.root.join(format!("{uid}.{CLIP_EXTENSION}"))
    }
}

impl ClipSource for DirectorySource {
    fn fetch(&self, uid: ResourceId) -> Result<ClipBytes> {
        let path = self.path_for(uid);
        match std::fs::read(&path) {
            Ok(data) => Ok(ClipBytes {
                name: uid.to_string(),
                data: Bytes::from(data),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AnimError::ResourceNotFound(uid)),
            Err(e) => Err(AnimError::Io(e)),
        }
    }
}

/// In-memory clip payloads
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<ResourceId, ClipBytes>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uid: ResourceId, name: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.insert(
            uid,
            ClipBytes {
                name: name.into(),
                data: data.into(),
            },
        );
    }

    /// Encode `clip` and store it under its own identifier
    pub fn insert_clip(&mut self, clip: &AnimationClip) -> Result<()> {
        let data = encode_clip(clip)?;
        self.insert(clip.uid(), clip.name(), data);
        Ok(())
    }
}

impl ClipSource for MemorySource {
    fn fetch(&self, uid: ResourceId) -> Result<ClipBytes> {
        self.entries
            .get(&uid)
            .cloned()
            .ok_or(AnimError::ResourceNotFound(uid))
    }
}

struct Entry {
    uid: ResourceId,
    clip: Rc<AnimationClip>,
    refcount: usize,
}

struct Inner {
    arena: Arena<Entry>,
    by_uid: HashMap<ResourceId, Index>,
    source: Box<dyn ClipSource>,
}

impl Inner {
    fn retain(&mut self, handle: Index) {
        if let Some(entry) = self.arena.get_mut(handle) {
            entry.refcount += 1;
        }
    }

    fn release(&mut self, handle: Index) {
        let Some(entry) = self.arena.get_mut(handle) else {
            warn!("Released a clip handle that is no longer resident");
            return;
        };
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount == 0 {
            let uid = entry.uid;
            self.arena.remove(handle);
            self.by_uid.remove(&uid);
            debug!("Evicted clip {uid}");
        }
    }
}

/// Shared handle to the clip cache. Clones refer to the same cache.
#[derive(Clone)]
pub struct ClipCache {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for ClipCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipCache")
            .field("resident", &self.resident_count())
            .finish_non_exhaustive()
    }
}

impl ClipCache {
    pub fn new(source: impl ClipSource + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                arena: Arena::new(),
                by_uid: HashMap::new(),
                source: Box::new(source),
            })),
        }
    }

    /// Take a reference to the clip, loading and decoding it on first use
    pub fn request(&self, uid: ResourceId) -> Result<ClipGuard> {
        let mut inner = self.inner.borrow_mut();

        if let Some(&handle) = inner.by_uid.get(&uid) {
            if let Some(entry) = inner.arena.get_mut(handle) {
                entry.refcount += 1;
                return Ok(ClipGuard {
                    cache: Rc::clone(&self.inner),
                    handle,
                    clip: Rc::clone(&entry.clip),
                });
            }
        }

        let bytes = inner.source.fetch(uid)?;
        let clip = Rc::new(decode_clip(uid, &bytes.name, &bytes.data)?);
        let handle = inner.arena.insert(Entry {
            uid,
            clip: Rc::clone(&clip),
            refcount: 1,
        });
        inner.by_uid.insert(uid, handle);
        debug!("Loaded clip {uid} '{}'", clip.name());

        Ok(ClipGuard {
            cache: Rc::clone(&self.inner),
            handle,
            clip,
        })
    }

    /// Number of clips currently loaded
    pub fn resident_count(&self) -> usize {
        self.inner.borrow().arena.len()
    }

    /// Outstanding references to `uid`, 0 when not resident
    pub fn refcount(&self, uid: ResourceId) -> usize {
        let inner = self.inner.borrow();
        inner
            .by_uid
            .get(&uid)
            .and_then(|&handle| inner.arena.get(handle))
            .map_or(0, |entry| entry.refcount)
    }

    pub fn contains(&self, uid: ResourceId) -> bool {
        self.inner.borrow().by_uid.contains_key(&uid)
    }
}

/// One counted reference to a cached clip
pub struct ClipGuard {
    cache: Rc<RefCell<Inner>>,
    handle: Index,
    clip: Rc<AnimationClip>,
}

impl ClipGuard {
    pub fn uid(&self) -> ResourceId {
        self.clip.uid()
    }
}

impl Deref for ClipGuard {
    type Target = AnimationClip;

    fn deref(&self) -> &Self::Target {
        &self.clip
    }
}

impl Clone for ClipGuard {
    fn clone(&self) -> Self {
        self.cache.borrow_mut().retain(self.handle);
        Self {
            cache: Rc::clone(&self.cache),
            handle: self.handle,
            clip: Rc::clone(&self.clip),
        }
    }
}

impl Drop for ClipGuard {
    fn drop(&mut self) {
        match self.cache.try_borrow_mut() {
            Ok(mut inner) => inner.release(self.handle),
            Err(_) => warn!("Clip cache busy while releasing clip {}", self.clip.uid()),
        }
    }
}

impl fmt::Debug for ClipGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipGuard")
            .field("uid", &self.clip.uid())
            .field("name", &self.clip.name())
            .finish()
    }
}

/// The set of clips a component holds across ticks.
///
/// [`ClipSet::sync`] requests newly required clips and drops guards for
/// clips no longer needed. A failed load is logged once and retried only
/// after the clip stops being required.
#[derive(Debug, Default)]
pub struct ClipSet {
    guards: BTreeMap<ResourceId, ClipGuard>,
    failed: HashSet<ResourceId>,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, cache: &ClipCache, required: &[ResourceId]) {
        self.guards.retain(|uid, _| required.contains(uid));
        self.failed.retain(|uid| required.contains(uid));

        for &uid in required {
            if self.guards.contains_key(&uid) || self.failed.contains(&uid) {
                continue;
            }
            match cache.request(uid) {
                Ok(guard) => {
                    self.guards.insert(uid, guard);
                }
                Err(e) => {
                    warn!("Failed to load clip {uid}: {e}");
                    self.failed.insert(uid);
                }
            }
        }
    }

    pub fn insert(&mut self, guard: ClipGuard) {
        self.failed.remove(&guard.uid());
        self.guards.insert(guard.uid(), guard);
    }

    pub fn clear(&mut self) {
        self.guards.clear();
        self.failed.clear();
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl ClipProvider for ClipSet {
    fn clip(&self, uid: ResourceId) -> Option<&AnimationClip> {
        self.guards.get(&uid).map(|guard| &**guard)
    }
}
