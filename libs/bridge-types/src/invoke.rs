use crate::Error;
use soroban_sdk::{Address, Env, Symbol, TryFromVal, Val, Vec};

/// Call `func` on another contract of the bridge and surface its `Error`.
///
/// A callee that fails with one of the shared error codes propagates that code.
/// A return value of the wrong type maps to `InvalidParameter`, and any other
/// host failure to `ExternalCallFailed`.
pub fn invoke<T>(env: &Env, contract: &Address, func: &str, args: Vec<Val>) -> Result<T, Error>
where
    T: TryFromVal<Env, Val>,
{
    match env.try_invoke_contract::<T, Error>(contract, &Symbol::new(env, func), args) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(Error::InvalidParameter),
        Err(Ok(error)) => Err(error),
        Err(Err(_)) => Err(Error::ExternalCallFailed),
    }
}
