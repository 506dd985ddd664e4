pub mod charges;
pub mod email;
pub mod normalize;
pub mod pdf;
pub mod processor;
pub mod record;
pub mod vision;
