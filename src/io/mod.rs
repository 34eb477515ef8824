pub mod checkpoint;
pub mod vtk;
