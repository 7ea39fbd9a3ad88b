use serde_json::Value;
use std::fmt::Debug;

use serde::Serialize;

pub fn result() -> Value {
    serde_json::json!({"success":true})
}

pub fn result_data<T: Serialize + Debug>(data: T) -> Value {
    serde_json::json!({"success":true,"data":data})
}

pub fn result_list<T: Serialize + Debug>(list: Vec<T>) -> Value {
    serde_json::json!({"success":true,"data":list})
}
