use crate::runtime::gc::heap_object::HeapObject;

/// One occupied heap slot.
///
/// `ref_count` counts every strong holder: container edges plus host handles.
/// `external` counts only the host handles and is what the collector treats
/// as the root set.
#[derive(Debug)]
pub struct HeapEntry {
    pub(crate) object: HeapObject,
    pub(crate) ref_count: u32,
    pub(crate) external: u32,
    pub(crate) marked: bool,
}

impl HeapEntry {
    pub(crate) fn new(object: HeapObject) -> Self {
        Self {
            object,
            ref_count: 0,
            external: 0,
            marked: false,
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.external > 0
    }
}
