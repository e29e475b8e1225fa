use crate::property::TPropData;

const DELETED: u8 = 1 << 0;
const DIRTY: u8 = 1 << 1;
const SUBDIV_VALID: u8 = 1 << 2;
const BOSS: u8 = 1 << 3;
const TAGGED: u8 = 1 << 4;

/// Per element status bits.
///
/// `dirty` marks vertices already queued on a level's dirty list,
/// `subdiv_valid` marks edges whose child vertex position is current, and
/// `boss` marks vertices whose position is driven externally.
#[derive(Clone, Copy, Default)]
pub struct Status {
    flags: u8,
}

impl TPropData for Status {}

impl Status {
    fn check(&self, i: u8) -> bool {
        self.flags & i > 0
    }

    fn set(&mut self, i: u8, flag: bool) {
        if flag {
            self.flags |= i;
        } else {
            self.flags &= !i;
        }
    }

    pub fn deleted(&self) -> bool {
        self.check(DELETED)
    }

    pub fn set_deleted(&mut self, flag: bool) {
        self.set(DELETED, flag);
    }

    pub fn dirty(&self) -> bool {
        self.check(DIRTY)
    }

    pub fn set_dirty(&mut self, flag: bool) {
        self.set(DIRTY, flag)
    }

    pub fn subdiv_valid(&self) -> bool {
        self.check(SUBDIV_VALID)
    }

    pub fn set_subdiv_valid(&mut self, flag: bool) {
        self.set(SUBDIV_VALID, flag)
    }

    pub fn boss(&self) -> bool {
        self.check(BOSS)
    }

    pub fn set_boss(&mut self, flag: bool) {
        self.set(BOSS, flag)
    }

    pub fn tagged(&self) -> bool {
        self.check(TAGGED)
    }

    pub fn set_tagged(&mut self, flag: bool) {
        self.set(TAGGED, flag)
    }
}
