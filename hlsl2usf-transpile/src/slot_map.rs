use crate::program::Texture;

/// Rank-based texture slot remap.
///
/// The target material binds its textures densely, in ascending order of the
/// original register, so original slot N becomes N's rank among all declared
/// texture slots: declared slots {2, 5, 1} map to {1 -> 0, 2 -> 1, 5 -> 2}.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlotMap {
    sorted_slots: Vec<u32>,
}

impl TextureSlotMap {
    pub fn new(textures: &[Texture]) -> Self {
        Self::from_slots(textures.iter().map(|t| t.slot))
    }

    pub fn from_slots(slots: impl IntoIterator<Item = u32>) -> Self {
        let mut sorted_slots: Vec<u32> = slots.into_iter().collect();
        sorted_slots.sort_unstable();
        sorted_slots.dedup();
        Self { sorted_slots }
    }

    /// Dense index of an original slot, or `None` if it was never declared.
    pub fn rank(&self, slot: u32) -> Option<usize> {
        self.sorted_slots.binary_search(&slot).ok()
    }

    pub fn len(&self) -> usize {
        self.sorted_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_slots.is_empty()
    }
}
