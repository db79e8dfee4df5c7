#[cfg(test)]
mod phase_tests;
