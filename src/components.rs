pub mod match_row;
