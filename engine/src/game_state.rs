use std::fmt::Debug;

pub trait GameState: PartialEq + Clone + Debug {
    fn initial() -> Self;
}
