pub mod renewal;
