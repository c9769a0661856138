//! The block sorter: Burrows-Wheeler transform via a hybrid two-byte radix
//! bucket pass, three-way quicksort and shell-sort refinement, with a
//! deterministic randomise-and-retry escape hatch for inputs that defeat
//! the comparison sort.
pub mod block_sort;
pub mod main_gtu;
pub mod main_q_sort3;
pub mod main_simple_sort;
pub mod main_sort;
pub mod rand_table;
