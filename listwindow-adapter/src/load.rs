use listwindow::{LoadParams, LoadTicket};

/// Which merge a load result goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadTarget {
    /// Append after the loaded items, following the cursor.
    Next,
    /// Place a numbered (1-based) page at its slot range, leaving holes before it if needed.
    Page(u64),
}

/// An issued fetch. The caller runs [`LoadRequest::params`] against its backend and hands the
/// request back with the result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub(crate) ticket: LoadTicket,
    pub(crate) params: LoadParams,
    pub(crate) target: LoadTarget,
}

impl LoadRequest {
    pub fn params(&self) -> &LoadParams {
        &self.params
    }

    pub fn target(&self) -> LoadTarget {
        self.target
    }

    /// List generation the request was issued in.
    pub fn epoch(&self) -> u64 {
        self.ticket.epoch()
    }
}
