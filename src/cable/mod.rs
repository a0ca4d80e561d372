use std::sync::atomic::{AtomicU64, Ordering};

/*
Patch Cables
============

A cable is a named, directed signal channel between two nodes. Think of the
physical patch cord on a modular case: one end plugs into an output jack, the
other into an input jack, and whatever voltage the source emits is what the
sink sees.

Nothing flows through a `Cable` in this crate. The handle only carries
identity; the values themselves live inside the engine that renders the
patch. Handing the same `Cable` to a source spec and a sink spec is what
"plugging in" means here:

  let gate = cables.allocate_named(CableKind::Control, "bass.gate");

  SequencerSpec { gate, .. }        // source end
  EnvelopeSpec  { gate, .. }        // sink end

Two Kinds:
----------
  Control: slow, scalar modulation streams (pitch CV, gates, envelopes)
  Audio:   audio-rate signals (oscillator output, filtered output, mix bus)

The kind is a label for humans and engines. It is not type-checked when a
patch is wired.

Identity:
---------
Ids come from one process-wide counter, so handles are unique across every
registry in the process and are never recycled.
*/

static NEXT_CABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Signal class carried by a cable (informational only)
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CableKind {
    Control,
    Audio,
}

/// Opaque handle for one directed signal channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cable {
    id: u64,
    kind: CableKind,
}

impl Cable {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> CableKind {
        self.kind
    }
}

impl std::fmt::Display for Cable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            CableKind::Control => "cv",
            CableKind::Audio => "audio",
        };
        write!(f, "#{}:{}", self.id, kind)
    }
}

/// Mints cable handles and remembers what each one was allocated for
#[derive(Debug, Default)]
pub struct CableRegistry {
    allocated: Vec<(Cable, &'static str)>,
}

impl CableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, unlabelled cable
    pub fn allocate(&mut self, kind: CableKind) -> Cable {
        self.allocate_named(kind, "")
    }

    /// Allocate a fresh cable and record the role it plays in the patch
    pub fn allocate_named(&mut self, kind: CableKind, label: &'static str) -> Cable {
        let id = NEXT_CABLE_ID.fetch_add(1, Ordering::Relaxed);
        let cable = Cable { id, kind };
        log::trace!("allocated cable {cable} ({label})");
        self.allocated.push((cable, label));
        cable
    }

    /// Role label recorded at allocation (`None` for foreign cables)
    pub fn label(&self, cable: Cable) -> Option<&'static str> {
        self.allocated
            .iter()
            .find(|(c, _)| *c == cable)
            .map(|(_, label)| *label)
    }

    /// Every cable minted by this registry, in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (Cable, &'static str)> + '_ {
        self.allocated.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.allocated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_allocations_are_distinct() {
        let mut cables = CableRegistry::new();
        let a = cables.allocate(CableKind::Control);
        let b = cables.allocate(CableKind::Control);

        assert_ne!(a, b);
        assert!(b.id() > a.id());
        assert_eq!(cables.len(), 2);
    }

    #[test]
    fn ids_are_unique_across_registries() {
        let mut first = CableRegistry::new();
        let mut second = CableRegistry::new();

        let a = first.allocate(CableKind::Audio);
        let b = second.allocate(CableKind::Audio);

        assert_ne!(a, b);
        assert_eq!(second.label(a), None);
    }

    #[test]
    fn copies_keep_identity() {
        let mut cables = CableRegistry::new();
        let gate = cables.allocate_named(CableKind::Control, "bass.gate");
        let sink_end = gate;

        assert_eq!(gate, sink_end);
        assert_eq!(cables.label(sink_end), Some("bass.gate"));
    }

    #[test]
    fn iter_preserves_allocation_order() {
        let mut cables = CableRegistry::new();
        cables.allocate_named(CableKind::Control, "one");
        cables.allocate_named(CableKind::Audio, "two");

        let labels: Vec<_> = cables.iter().map(|(_, label)| label).collect();
        assert_eq!(labels, ["one", "two"]);
        assert_eq!(cables.iter().nth(1).map(|(c, _)| c.kind()), Some(CableKind::Audio));
    }
}
