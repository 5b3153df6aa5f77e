//! Fixed prompt contracts
//!
//! The backends are interchangeable because the instructions are ours: JSON
//! only, exact keys, pt-BR number conventions spelled out with examples.

/// Prompt for extracting vehicle registration data from a command
pub fn vehicle_prompt(command: &str) -> String {
    format!(
        r#"Você é um assistente especializado em extrair informações de veículos.

Analise o seguinte comando em português e extraia os dados do veículo:
"{command}"

Retorne APENAS um objeto JSON válido (sem markdown, sem explicações) com esta estrutura:
{{
  "marca": "string ou null",
  "modelo": "string ou null",
  "ano": number ou null,
  "cor": "string ou null",
  "placa": "string ou null",
  "km": number ou null,
  "preco_compra": number ou null
}}

REGRAS IMPORTANTES:
1. Marcas comuns: Honda, Toyota, Fiat, Volkswagen, VW, Chevrolet, Ford, Hyundai, Nissan, Renault
2. Converta valores monetários: "50 mil" = 50000, "80k" = 80000, "R$ 45.000" = 45000
3. Converta quilometragem: "100 mil km" = 100000, "80k km" = 80000
4. Anos válidos: 1980-2026 (apenas 4 dígitos)
5. Placa: formato brasileiro (ABC1234 ou ABC-1234 ou ABC1D23)
6. Preço pode ser mencionado como: "valor", "preço", "por", "R$", "reais"
7. Se não encontrar um dado, use null

EXEMPLOS:
- "cadastrar honda civic 2020 preto 50 mil" → {{"marca":"Honda","modelo":"Civic","ano":2020,"cor":"preto","preco_compra":50000}}
- "fiat uno 2015 branco 100 mil km por 30000" → {{"marca":"Fiat","modelo":"Uno","ano":2015,"cor":"branco","km":100000,"preco_compra":30000}}

Retorne APENAS o JSON, sem texto adicional."#
    )
}

/// Prompt for extracting an expense batch from a command
pub fn expense_prompt(command: &str) -> String {
    format!(
        r#"Você é um assistente especializado em extrair informações de gastos de veículos.

Analise o seguinte comando e extraia as informações:
"{command}"

Retorne APENAS um objeto JSON válido (sem markdown) com esta estrutura:
{{
  "modelo": "string ou null",
  "placa": "string ou null",
  "gastos": [
    {{
      "tipo": "peça|serviço|documentação|manutenção|outro",
      "valor": number
    }}
  ]
}}

REGRAS:
1. Extraia TODOS os gastos mencionados no comando
2. Valores: "80 reais" = 80, "R$ 200" = 200
3. Se mencionar modelo (ex: "Civic", "Gol"), extraia
4. Se mencionar placa (ex: "ABC1234"), extraia

EXEMPLOS:
- "gol placa abc1234 gastei 80 reais em peça e 200 em serviço" → {{"modelo":"Gol","placa":"ABC1234","gastos":[{{"tipo":"peça","valor":80}},{{"tipo":"serviço","valor":200}}]}}
- "civic gastei 150 em documentação" → {{"modelo":"Civic","placa":null,"gastos":[{{"tipo":"documentação","valor":150}}]}}

Retorne APENAS o JSON."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_command() {
        let p = vehicle_prompt("cadastrar honda civic 2020");
        assert!(p.contains("\"cadastrar honda civic 2020\""));
        assert!(p.contains("preco_compra"));

        let p = expense_prompt("placa abc1234 câmbio r$ 200");
        assert!(p.contains("\"placa abc1234 câmbio r$ 200\""));
        assert!(p.contains("gastos"));
    }
}
