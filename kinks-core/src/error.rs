/// Reasons a selection cannot be analysed for self-intersections.
///
/// None of these are failures from the user's point of view: the controller maps every
/// variant to [`ValidationState::Idle`](crate::validation::ValidationState::Idle) and clears
/// any warning.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AdapterError {
    #[error("No feature selected")]
    NoSelection,

    #[error("Not an area feature: {0}")]
    UnsupportedGeometry(String),

    #[error("Ring has {vertices} distinct vertices, need at least 4")]
    DegenerateRing { vertices: usize },

    #[error("Expected a single exterior ring, found {rings}")]
    MultiRingUnsupported { rings: usize },

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),
}
