pub mod geography;
pub mod herbarium;
pub mod observation;
pub mod species;
