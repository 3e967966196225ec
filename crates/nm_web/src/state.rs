use crate::mock::MockGenerator;

pub struct AppState {
    pub generator: MockGenerator,
}
