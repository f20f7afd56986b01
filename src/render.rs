pub mod colormap;
pub mod julia;
