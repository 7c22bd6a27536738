// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod document_store;
        pub(crate) mod in_memory_document_store;
        pub(crate) mod json_file_document_store;
    }
    pub(crate) mod models {
        pub(crate) mod amount_model;
        pub(crate) mod iso_date_model;
        pub(crate) mod payment_model;
        pub(crate) mod record_model;
        pub(crate) mod section_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod payments_repository_impl;
        pub(crate) mod records_repository_impl;
        pub(crate) mod roster_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod aggregated_state;
        pub(crate) mod authorization;
        pub(crate) mod financial_record;
        pub(crate) mod payment;
        pub(crate) mod section;
        pub(crate) mod statistics;
    }
    pub(crate) mod logic {
        pub(crate) mod aggregation_engine;
        pub(crate) mod authorization_policy;
        pub(crate) mod record_filters;
        pub(crate) mod utils;
    }
    pub(crate) mod repositories {
        pub(crate) mod payments_repository;
        pub(crate) mod records_repository;
        pub(crate) mod roster_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod command_usecase;
        pub(crate) mod query_usecase;
    }
}

pub(crate) mod presentation {
    pub(crate) mod annual_report_printer;
    pub(crate) mod monthly_breakdown_csv;
    pub(crate) mod utils;
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::aggregated_state::*;
        pub use crate::domain::entities::authorization::*;
        pub use crate::domain::entities::financial_record::*;
        pub use crate::domain::entities::payment::*;
        pub use crate::domain::entities::section::*;
        pub use crate::domain::entities::statistics::*;
    }

    pub mod aggregation {
        pub use crate::domain::logic::aggregation_engine::*;
        pub use crate::domain::logic::authorization_policy::*;
        pub use crate::domain::logic::record_filters::*;
        pub use crate::domain::logic::utils::accounting_date;
    }

    pub mod stores {
        pub use crate::data::datasources::document_store::*;
        pub use crate::data::datasources::in_memory_document_store::InMemoryDocumentStore;
        pub use crate::data::datasources::json_file_document_store::JsonFileDocumentStore;
    }
}
