pub mod export;
pub mod init;
pub mod report;
pub mod run;
pub mod sites;
pub mod stats;
