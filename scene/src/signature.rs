use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use sha2::{Digest, Sha256};

use crate::{
    shape::channel_sum,
    synth::{SceneDescription, SceneObject},
};

/// Order-independent content digest of a scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 32]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

pub fn sign(scene: &SceneDescription) -> Signature {
    let digest = Sha256::digest(canonical_form(scene).as_bytes());
    Signature(digest.into())
}

/// Stable text form of a scene: object count, per-shape counts ordered by tag,
/// then every object sorted by position, shape, color sum, size.
pub fn canonical_form(scene: &SceneDescription) -> String {
    let mut shape_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for kind in scene.shapes() {
        *shape_counts.entry(kind.tag()).or_default() += 1;
    }

    let mut objects: Vec<SceneObject> = scene.objects().collect();
    objects.sort_by_key(|o| {
        (
            o.position.x,
            o.position.y,
            o.shape.tag(),
            channel_sum(o.color),
            o.size,
            // total order: equal multisets must sort identically
            o.color,
        )
    });

    let mut out = String::with_capacity(32 + objects.len() * 32);
    out.push_str(&format!("n={};", scene.object_count()));
    for (tag, n) in &shape_counts {
        out.push_str(&format!("{tag}:{n},"));
    }
    out.push(';');
    for o in &objects {
        let [r, g, b] = o.color;
        out.push_str(&format!(
            "({},{},{},{},{},{},{},{})",
            o.shape.tag(),
            r,
            g,
            b,
            o.size,
            o.position.x,
            o.position.y,
            channel_sum(o.color)
        ));
    }
    out
}

/// Signatures seen by one generator. Grows monotonically.
#[derive(Debug, Default)]
pub struct SignatureSet {
    seen: HashSet<Signature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `sig` and returns `true` if it was not present.
    pub fn insert_if_absent(&mut self, sig: Signature) -> bool {
        self.seen.insert(sig)
    }

    pub fn contains(&self, sig: &Signature) -> bool {
        self.seen.contains(sig)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
