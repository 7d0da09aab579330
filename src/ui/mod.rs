mod compose;

pub use compose::WishForm;
