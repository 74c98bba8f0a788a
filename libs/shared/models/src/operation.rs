use std::fmt;

/// A remote call a session can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Login,
    FetchProfile,
    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl Operation {
    /// Status code the service answers with when the call succeeds.
    pub fn expected_status(&self) -> u16 {
        match self {
            Operation::Register | Operation::CreateProduct => 201,
            Operation::DeleteProduct => 204,
            Operation::Login
            | Operation::FetchProfile
            | Operation::ListProducts
            | Operation::UpdateProduct => 200,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Register => "registration",
            Operation::Login => "login",
            Operation::FetchProfile => "profile retrieval",
            Operation::ListProducts => "product listing",
            Operation::CreateProduct => "product creation",
            Operation::UpdateProduct => "product update",
            Operation::DeleteProduct => "product deletion",
        };
        f.write_str(label)
    }
}
