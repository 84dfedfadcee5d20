pub mod fixtures;

#[cfg(test)]
mod orchestrator_tests;
#[cfg(test)]
mod recording_gc_tests;
#[cfg(test)]
mod name_tests;
