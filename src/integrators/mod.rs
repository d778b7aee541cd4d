pub mod dp54;
