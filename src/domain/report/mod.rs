pub mod report_kind;
pub mod report_tree;
