//! Instruction prompt for the model extractor
//!
//! The code lists are rendered from the active `Vocabulary` so the model is
//! only ever offered codes the pipeline accepts.

use crate::vocabulary::{Fiber, Vocabulary};

/// Build the fixed instruction block for `vocabulary`
pub fn build_prompt(vocabulary: &Vocabulary) -> String {
    let fiber_codes: Vec<&str> = vocabulary.fiber_codes().collect();
    let weave_codes: Vec<&str> = vocabulary.weave_codes().collect();
    let code = |fiber: Fiber| {
        vocabulary
            .code_for(fiber)
            .unwrap_or_else(|| fiber.code(vocabulary.scheme()))
    };

    format!(
        r#"# Role
You are a fashion fabric data specialist. Parse the unstructured fabric
specification string into the JSON object below.

# Output Schema (strict JSON)
Output ONLY one JSON object with exactly these keys. Every key must be
present; use null (or an empty array) when a value is not found. Do not add
any other key at any level.

{{
  "meta": {{
    "original_text": "the exact input string",
    "etc_info": "input fragments not parsed into any field below, or empty",
    "ai_analysis_kr": "Korean description of the fabric: characteristics, texture, typical use",
    "predicted_material": "e.g. Nylon, Polyester, Cotton (inferred from hints like Taslan, T-density, Oxford)",
    "construction_type": "e.g. Taslan, Taffeta, Oxford, Twill"
  }},
  "compositions": [
    {{ "fiberType": "one of: {fibers}", "percentage": 100 }}
  ],
  "yarn_spec": {{
    "warp": {{ "raw_text": "e.g. 70D/36F FDY FD", "denier": 70, "filament": 36, "process_type": "FDY|DTY|ATY|ITY or null", "luster": "FD|SD|BR|TKT or null" }},
    "weft": {{ "raw_text": "e.g. 160D/96F ATY FD", "denier": 160, "filament": 96, "process_type": "FDY|DTY|ATY|ITY or null", "luster": "FD|SD|BR|TKT or null" }}
  }},
  "physical_spec": {{
    "density_total": 228,
    "weight_gsm": 120,
    "width_inch": "58/60",
    "finishings_code": ["PD", "WR"],
    "finishings_desc": ["Plain Dyed", "Water Repellent"]
  }},
  "classification": {{
    "fabric_code": "one of: {weaves}",
    "fabric_name_kr": "e.g. 기본 평직, 옥스포드, 능직"
  }}
}}

# Fiber codes
Nylon -> {nylon}; Polyester -> {polyester}; Cotton -> {cotton}; Linen -> {linen};
Wool -> {wool}; Silk -> {silk}; Polyurethane -> {pu}; Spandex/Elastane -> {el};
Acrylic -> {acrylic}; Viscose/Rayon -> {viscose}; Modal -> {modal};
Lyocell/Tencel -> {lyocell}; Microfiber -> {micro}; Cashmere -> {cashmere}.
- A single fiber without a percentage is 100.
- Combined notation such as "C/N 60/40" splits in the stated order ({cotton}: 60, {nylon}: 40).
- Several fibers named without any ratio split evenly.
- No fiber mentioned: {nylon} 100 when Taslan or Cordura appears, otherwise {polyester} 100.
- percentage is always an integer and the percentages sum to 100.

# Weave code (first match wins)
Oxford -> PO; Ripstop -> PR; Twill -> TW; Satin -> SA; Dobby -> DO; Jersey -> KS;
Taslan or Plain or no weave mentioned -> PL; any other construction -> ZZ.

# Parsing rules
1. Yarn: split on '*' or 'x'. First part is warp, second is weft.
   Process type is one of FDY, DTY, ATY, ITY. Luster is one of FD, SD, BR, TKT.
   "FDY" is a process, "FD" is a luster: "FDY FD" means process FDY and luster FD.
2. Density: "228T" -> density_total 228.
3. Weight: strip "GSM" or "g/y".
4. Width: a number or range followed by '"' or "inch" (56", 58/60 inch) -> "58/60".
5. Anything not found is null.
"#,
        fibers = fiber_codes.join(", "),
        weaves = weave_codes.join(", "),
        nylon = code(Fiber::Nylon),
        polyester = code(Fiber::Polyester),
        cotton = code(Fiber::Cotton),
        linen = code(Fiber::Linen),
        wool = code(Fiber::Wool),
        silk = code(Fiber::Silk),
        pu = code(Fiber::Polyurethane),
        el = code(Fiber::Elastane),
        acrylic = code(Fiber::Acrylic),
        viscose = code(Fiber::Viscose),
        modal = code(Fiber::Modal),
        lyocell = code(Fiber::Lyocell),
        micro = code(Fiber::Microfiber),
        cashmere = code(Fiber::Cashmere),
    )
}

/// User turn carrying the raw text
pub fn user_message(raw: &str) -> String {
    format!("Analyze this text: \"{raw}\"")
}
