pub mod skatteverket;
