/// Slot index of an object on a [`super::GcHeap`].
///
/// Container objects store these for their children. The host never holds
/// one directly, only through the counted [`crate::runtime::value::Value`]
/// wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GcHandle(pub(crate) u32);

impl GcHandle {
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}
