//! Owning storage for blocks and frames, indexed by id.

use crate::block::Block;
use crate::frame::ScopeFrame;
use livepack_common::{BlockId, FrameId};

#[derive(Default)]
pub struct ScopeStore {
    blocks: Vec<Block>,
    frames: Vec<ScopeFrame>,
}

impl ScopeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = block.id;
        debug_assert_eq!(id.index(), self.blocks.len(), "blocks must be added in id order");
        self.blocks.push(block);
        id
    }

    pub fn add_frame(&mut self, frame: ScopeFrame) -> FrameId {
        let id = frame.id;
        debug_assert_eq!(id.index(), self.frames.len(), "frames must be added in id order");
        self.frames.push(frame);
        id
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    #[must_use]
    pub fn frame(&self, id: FrameId) -> &ScopeFrame {
        &self.frames[id.index()]
    }

    pub fn frame_mut(&mut self, id: FrameId) -> &mut ScopeFrame {
        &mut self.frames[id.index()]
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut Vec<ScopeFrame> {
        &mut self.frames
    }

    #[must_use]
    pub fn frames_of_block(&self, block: BlockId) -> impl Iterator<Item = &ScopeFrame> {
        self.frames.iter().filter(move |f| f.block == block)
    }

    pub fn next_frame_id(&self) -> FrameId {
        FrameId(self.frames.len() as u32)
    }
}
