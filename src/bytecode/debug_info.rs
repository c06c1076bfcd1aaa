use crate::frontend::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionLocation {
    pub offset: usize,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDebugInfo {
    pub name: Option<String>,
    pub locations: Vec<InstructionLocation>,
}

impl FunctionDebugInfo {
    pub fn new(name: Option<String>, locations: Vec<InstructionLocation>) -> Self {
        Self { name, locations }
    }

    /// Source position of the instruction at `ip`, or of the nearest one before it.
    pub fn location_at(&self, ip: usize) -> Option<Position> {
        match self
            .locations
            .binary_search_by_key(&ip, |entry| entry.offset)
        {
            Ok(index) => self.locations.get(index).and_then(|entry| entry.position),
            Err(index) => index
                .checked_sub(1)
                .and_then(|prev| self.locations.get(prev))
                .and_then(|entry| entry.position),
        }
    }
}
