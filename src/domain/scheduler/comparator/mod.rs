pub mod fullness_compare;
