use super::render::{RegionHandle, Renderer};
use crate::types::ContentBlock;
use std::collections::{BTreeMap, HashMap};

/// Per-stream accumulation state, keyed by content index.
///
/// Delta text only grows by appending in arrival order. Region handles are
/// created on first use and reused for the rest of the stream.
#[derive(Debug, Default)]
pub struct RegionAccumulator {
    buffers: BTreeMap<usize, String>,
    regions: HashMap<usize, RegionHandle>,
    placed: Vec<(usize, ContentBlock)>,
    first_seen: Vec<usize>,
}

impl RegionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment and returns everything accumulated for `index`.
    pub fn append(&mut self, index: usize, text: &str) -> &str {
        self.note_seen(index);
        let buffer = self.buffers.entry(index).or_default();
        buffer.push_str(text);
        buffer
    }

    /// Records a complete, non-incremental block for `index`.
    pub fn place(&mut self, index: usize, block: ContentBlock) {
        self.note_seen(index);
        self.placed.push((index, block));
    }

    pub fn get_or_create_region<R: Renderer + ?Sized>(
        &mut self,
        index: usize,
        renderer: &mut R,
    ) -> RegionHandle {
        *self
            .regions
            .entry(index)
            .or_insert_with(|| renderer.create_region(index))
    }

    pub fn buffer(&self, index: usize) -> Option<&str> {
        self.buffers.get(&index).map(String::as_str)
    }

    pub fn region(&self, index: usize) -> Option<RegionHandle> {
        self.regions.get(&index).copied()
    }

    /// Content indices in the order they first received text or a block.
    pub fn first_seen(&self) -> &[usize] {
        &self.first_seen
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty() && self.placed.is_empty()
    }

    /// All delta buffers concatenated in ascending index order, no separator.
    pub fn merged_text(&self) -> Option<String> {
        if self.buffers.is_empty() {
            return None;
        }
        Some(self.buffers.values().map(String::as_str).collect())
    }

    /// Content for an assistant message rebuilt from the stream itself.
    ///
    /// The merged delta text sits where the first text-bearing index was
    /// introduced; placed blocks follow their own index's first appearance.
    pub fn fallback_content(&self) -> Vec<ContentBlock> {
        let mut content = Vec::new();
        let mut merged = self.merged_text();

        for index in &self.first_seen {
            if self.buffers.contains_key(index) {
                if let Some(text) = merged.take() {
                    content.push(ContentBlock::Text { text });
                }
            }
            content.extend(
                self.placed
                    .iter()
                    .filter(|(placed_index, _)| placed_index == index)
                    .map(|(_, block)| block.clone()),
            );
        }

        content
    }

    fn note_seen(&mut self, index: usize) {
        if !self.first_seen.contains(&index) {
            self.first_seen.push(index);
        }
    }
}
