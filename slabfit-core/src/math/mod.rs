mod bounds;
pub use self::bounds::*;

mod plane;
pub use self::plane::*;

mod slab;
pub use self::slab::*;
