use curl::easy::{Handler, WriteError};

use crate::state::RequestState;

/// Collects the response of an easy handle.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    pub(crate) state: RequestState,
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if self.state.write_data(data) {
            Ok(data.len())
        } else {
            // A short write aborts the transfer.
            Ok(0)
        }
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.state.push_header_data(data);
        true
    }
}
