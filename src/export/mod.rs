mod stl;

pub use stl::{read_stl, write_stl, StlFormat, WriteStl};
