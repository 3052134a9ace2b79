use std::collections::BTreeMap;

use chakugo_xlsx::conf::derive_default_process_options;
use chakugo_xlsx::spec::{ChakugoError, SpecExtractPolicy, SpecProcessOptions};
use chakugo_xlsx::{SpecDeliveryFile, process_ipc_bytes, process_workbook as rs_process_workbook};
use chrono::{DateTime, Utc};
use log::debug;
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "chakugo.xlsx.delivery.v1";

#[pyclass(name = "Delivery")]
struct PyDelivery {
    #[pyo3(get)]
    file_name: String,
    #[pyo3(get)]
    mime: String,
    #[pyo3(get)]
    warnings: Vec<String>,
    counts: BTreeMap<String, u64>,
    data: Vec<u8>,
}

#[pymethods]
impl PyDelivery {
    #[getter]
    fn counts(&self) -> BTreeMap<String, u64> {
        self.counts.clone()
    }

    fn data<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &self.data)
    }

    fn __len__(&self) -> usize {
        self.data.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Delivery(file_name={:?}, bytes={}, matched={})",
            self.file_name,
            self.data.len(),
            self.counts.get("cnt_matched").copied().unwrap_or(0)
        )
    }
}

impl From<SpecDeliveryFile> for PyDelivery {
    fn from(delivery: SpecDeliveryFile) -> Self {
        Self {
            counts: delivery.report.to_dict(),
            warnings: delivery.report.warnings,
            file_name: delivery.file_name,
            mime: delivery.mime,
            data: delivery.data,
        }
    }
}

#[pyfunction]
#[pyo3(signature = (data, now_timestamp = None, policy = None))]
fn process_workbook(
    py: Python<'_>,
    data: &[u8],
    now_timestamp: Option<i64>,
    policy: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyDelivery> {
    let now = derive_now(now_timestamp)?;
    let cfg_options = derive_process_options(policy)?;
    let delivery = py
        .allow_threads(|| rs_process_workbook(data, now, &cfg_options))
        .map_err(derive_py_error)?;
    Ok(delivery.into())
}

#[pyfunction]
#[pyo3(signature = (df, now_timestamp = None, policy = None))]
fn process_dataframe(
    py: Python<'_>,
    df: &Bound<'_, PyAny>,
    now_timestamp: Option<i64>,
    policy: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyDelivery> {
    let now = derive_now(now_timestamp)?;
    let cfg_options = derive_process_options(policy)?;
    let v_ipc_df = derive_ipc_bytes_from_any_dataframe(py, df)?;
    debug!("received {} bytes of IPC dataframe", v_ipc_df.len());
    let delivery = py
        .allow_threads(|| process_ipc_bytes(&v_ipc_df, now, &cfg_options))
        .map_err(derive_py_error)?;
    Ok(delivery.into())
}

#[pyfunction]
#[pyo3(signature = (now_timestamp = None, policy = None))]
fn derive_file_name(
    now_timestamp: Option<i64>,
    policy: Option<&Bound<'_, PyAny>>,
) -> PyResult<String> {
    let now = derive_now(now_timestamp)?;
    let cfg_policy = parse_spec_extract_policy(policy)?;
    chakugo_xlsx::derive_file_name(now, cfg_policy.utc_offset_hours, &cfg_policy.label_footer)
        .map_err(derive_py_error)
}

fn derive_now(now_timestamp: Option<i64>) -> PyResult<DateTime<Utc>> {
    match now_timestamp {
        None => Ok(Utc::now()),
        Some(n_secs) => DateTime::from_timestamp(n_secs, 0).ok_or_else(|| {
            PyValueError::new_err(format!("Timestamp out of range: {n_secs}"))
        }),
    }
}

fn derive_process_options(policy: Option<&Bound<'_, PyAny>>) -> PyResult<SpecProcessOptions> {
    let mut cfg_options = derive_default_process_options();
    cfg_options.policy = parse_spec_extract_policy(policy)?;
    Ok(cfg_options)
}

fn parse_spec_extract_policy(obj: Option<&Bound<'_, PyAny>>) -> PyResult<SpecExtractPolicy> {
    let mut cfg_policy = SpecExtractPolicy::default();
    let Some(obj) = obj else {
        return Ok(cfg_policy);
    };
    if obj.is_none() {
        return Ok(cfg_policy);
    }

    if let Some(val) = extract_optional_attr::<String>(obj, "marker_loose_item")? {
        cfg_policy.marker_loose_item = val;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, "suffix_excluded_variant")? {
        cfg_policy.suffix_excluded_variant = val;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, "suffix_excluded_vendor")? {
        cfg_policy.suffix_excluded_vendor = val;
    }
    if let Some(l_labels) = extract_optional_attr::<Vec<String>>(obj, "labels_header")? {
        cfg_policy.labels_header = <[String; 3]>::try_from(l_labels).map_err(|l_labels| {
            PyValueError::new_err(format!(
                "`labels_header` must hold exactly 3 labels, got {}.",
                l_labels.len()
            ))
        })?;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, "label_footer")? {
        cfg_policy.label_footer = val;
    }
    if let Some(val) = extract_optional_attr::<i32>(obj, "utc_offset_hours")? {
        cfg_policy.utc_offset_hours = val;
    }
    Ok(cfg_policy)
}

fn derive_ipc_bytes_from_any_dataframe(
    py: Python<'_>,
    df: &Bound<'_, PyAny>,
) -> PyResult<Vec<u8>> {
    let df_polars = convert_to_polars_dataframe(py, df)?;
    let obj_buffer = df_polars.call_method1("write_ipc", (py.None(),))?;
    obj_buffer.call_method0("getvalue")?.extract::<Vec<u8>>()
}

fn convert_to_polars_dataframe<'py>(
    py: Python<'py>,
    df: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let module_polars = py.import("polars")?;
    let cls_dataframe = module_polars.getattr("DataFrame")?;

    if df.is_instance(&cls_dataframe)? {
        return Ok(df.clone());
    }

    cls_dataframe.call1((df,))
}

fn extract_optional_attr<T>(obj: &Bound<'_, PyAny>, attr: &str) -> PyResult<Option<T>>
where
    for<'a> T: FromPyObject<'a>,
{
    if !obj.hasattr(attr)? {
        return Ok(None);
    }
    let val = obj.getattr(attr)?;
    if val.is_none() {
        return Ok(None);
    }
    Ok(Some(val.extract::<T>()?))
}

fn derive_py_error(err: ChakugoError) -> PyErr {
    match err {
        ChakugoError::MissingColumn { .. } => PyKeyError::new_err(err.to_string()),
        ChakugoError::InvalidQuantity { .. }
        | ChakugoError::EmptyWorkbook
        | ChakugoError::Read(_)
        | ChakugoError::InvalidDate(_) => PyValueError::new_err(err.to_string()),
        ChakugoError::Write(_) | ChakugoError::IndexOverflow(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

#[pymodule]
fn _chakugo_xlsx_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    let _ = env_logger::try_init();
    module.add_class::<PyDelivery>()?;
    module.add_function(wrap_pyfunction!(process_workbook, module)?)?;
    module.add_function(wrap_pyfunction!(process_dataframe, module)?)?;
    module.add_function(wrap_pyfunction!(derive_file_name, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    Ok(())
}

