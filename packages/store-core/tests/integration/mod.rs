mod compaction;
mod reopen;
mod scenarios;
mod update_delete;
