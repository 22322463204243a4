#![doc = r#"
# spark-codec-postcard-tck

## 章节定位（Why）
- **目标**：以语言无关的 JSON 黄金向量锁定 postcard 线格式，任何实现只要能读懂向量文件就能复现同一套断言；
- **范围**：覆盖参考类型全集（原语、容器、复合、集合、嵌套模块）、线格式边界值与典型的非法输入。

## 结构概览（How）
- [`VectorSuite`]/[`VectorCase`]：向量文件的反序列化模型，字节以小写十六进制保存；
- [`fixtures`]：参考类型注册表与程序化构造的期望值；
- [`assert_golden`]：对单个用例执行"解码等于期望值且无剩余"与"编码等于向量字节"两条断言。

## 契约说明（What）
- 正向用例必须在 [`fixtures::value`] 中有同名期望值；
- 带 `expect_error` 的反向用例只校验解码失败且错误码一致，不需要期望值。
"#]

pub mod fixtures;

use std::{fs, path::Path};

use anyhow::{Context, bail, ensure};
use serde::Deserialize;
use spark_codec_postcard::{Codec, Schema};

/// 向量文件的顶层结构。
///
/// ## 契约约束（What）
/// - `suite` 用于失败信息中标识来源文件；
/// - `cases` 按文件顺序执行，至少包含一个用例。
#[derive(Clone, Debug, Deserialize)]
pub struct VectorSuite {
    /// 套件名称。
    pub suite: String,
    /// 用例列表。
    pub cases: Vec<VectorCase>,
}

/// 单个向量用例。
#[derive(Clone, Debug, Deserialize)]
pub struct VectorCase {
    /// 用例标签，与 [`fixtures::value`] 对应。
    pub label: String,
    /// 参考注册表中的类型名。
    pub schema_ref: String,
    /// 小写十六进制字节。
    pub hex: String,
    /// 期望的解码错误码；存在时该用例为反向用例。
    #[serde(default)]
    pub expect_error: Option<String>,
}

impl VectorCase {
    /// 解析十六进制字节。
    pub fn bytes(&self) -> anyhow::Result<Vec<u8>> {
        ensure!(
            !self.hex.bytes().any(|b| b.is_ascii_uppercase()),
            "case `{}`: hex must be lowercase",
            self.label
        );
        hex::decode(&self.hex).with_context(|| format!("case `{}`: invalid hex", self.label))
    }
}

/// 从 JSON 文本解析向量套件。
pub fn parse_suite(json: &str) -> anyhow::Result<VectorSuite> {
    let suite: VectorSuite = serde_json::from_str(json).context("malformed vector suite")?;
    ensure!(!suite.cases.is_empty(), "suite `{}` has no cases", suite.suite);
    Ok(suite)
}

/// 从文件加载向量套件。
pub fn load_suite(path: impl AsRef<Path>) -> anyhow::Result<VectorSuite> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read vector file {}", path.display()))?;
    parse_suite(&json).with_context(|| format!("in vector file {}", path.display()))
}

/// 对单个用例执行黄金断言。
///
/// # 教案式说明
/// - **意图（Why）**：只比较编码输出无法发现"解码接受了错误字节"的缺陷，只比较解码结果又无法发现编码漂移，因此两个方向都要断言；
/// - **流程（How）**：
///   1. 以 `schema_ref` 在参考注册表中寻址 Schema；
///   2. 反向用例：解码必须失败，且错误码等于 `expect_error`；
///   3. 正向用例：非穷尽解码得到的值等于期望值且剩余为空，再编码期望值并逐字节比较；
/// - **契约（What）**：任何偏差都以带用例标签的 `anyhow::Error` 返回。
pub fn assert_golden(codec: &Codec, case: &VectorCase) -> anyhow::Result<()> {
    let bytes = case.bytes()?;
    let schema = Schema::named(case.schema_ref.as_str());
    let label = case.label.as_str();

    if let Some(expected) = &case.expect_error {
        return match codec.decode(&schema, &bytes) {
            Ok(value) => bail!("case `{label}`: expected error {expected}, decoded {value:?}"),
            Err(err) => {
                ensure!(
                    err.code() == expected.as_str(),
                    "case `{label}`: expected error {expected}, got {} ({err})",
                    err.code()
                );
                Ok(())
            }
        };
    }

    let expected = fixtures::value(label)
        .with_context(|| format!("case `{label}`: no fixture value for this label"))?;

    let (decoded, rest) = codec
        .take(&schema, &bytes)
        .with_context(|| format!("case `{label}`: decode failed"))?;
    ensure!(
        rest.is_empty(),
        "case `{label}`: {} trailing byte(s) after decode",
        rest.len()
    );
    ensure!(
        decoded == expected,
        "case `{label}`: decoded value differs\n  decoded:  {decoded:?}\n  expected: {expected:?}"
    );

    let encoded = codec
        .encode(&schema, &expected)
        .with_context(|| format!("case `{label}`: encode failed"))?;
    ensure!(
        encoded == bytes,
        "case `{label}`: encoded bytes differ\n  encoded:  {}\n  expected: {}",
        hex::encode(&encoded),
        case.hex
    );
    Ok(())
}

/// 对整个套件执行断言，返回通过的用例数。
pub fn assert_suite(codec: &Codec, suite: &VectorSuite) -> anyhow::Result<usize> {
    for case in &suite.cases {
        assert_golden(codec, case).with_context(|| format!("suite `{}`", suite.suite))?;
    }
    Ok(suite.cases.len())
}
