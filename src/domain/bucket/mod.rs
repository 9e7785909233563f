pub mod bucket_set;
