//! Prompt construction for email classification.
//!
//! The system instruction is fixed and never influenced by user input. The
//! reply strings below are a user-visible contract: the model is told to
//! return them verbatim and callers compare against them.

/// Bumped whenever [`SYSTEM_INSTRUCTION`] changes meaning.
pub const PROMPT_VERSION: &str = "2024-09-v1";

/// Canned reply for emails that need a work response.
pub const REPLY_PRODUTIVO: &str = "Obrigado pelo contato! Vimos sua demanda e vamos redirecioná-la para alguém responsável imediatamente.";

/// Canned reply for social or promotional emails.
pub const REPLY_IMPRODUTIVO: &str =
    "Obrigado pelo contato! Vimos sua mensagem. Responderemos assim que possível.";

/// Fixed classification rules sent as the system message.
pub const SYSTEM_INSTRUCTION: &str = r#"Você é um assistente que classifica e-mails RECEBIDOS (pt-BR) em:
- "Produtivo": requer ação/resposta relacionada ao trabalho/negócio/operacional.
- "Improdutivo": saudações, mensagens sociais, divulgação, sem ação de trabalho.

USE AS PISTAS ABAIXO COMO GUIA (não são listas exaustivas):
- Exemplos de temas de TRABALHO (sinais de produtivo): status, andamento, suporte, erro, falha, bug, pendente, prazo, protocolo, anexo, documento, comprovante, fatura, boleto, agendamento, cancelamento, reembolso, cadastro, senha, acesso, liberação, homologação, produção, financeiro, pagamento, estorno, chamado, ticket, retorno, resposta, confirmar, verificar, verificação, atender, resolver, contrato, nota fiscal, NF, cobrança, fornecedor, cliente, proposta, orçamento, infraestrutura, servidor, API, deploy, SLA, faturamento, auditoria.
- Exemplos de NÃO TRABALHO/IMPRODUTIVO: "feliz natal", "feliz ano novo", "boas festas", "parabéns", "felicidades", "bom dia/boa tarde/boa noite" sem pedido concreto, agradecimentos genéricos, "newsletter", "divulgação", "promoção".

RETORNE SOMENTE JSON de uma única linha:
{
  "categoria": "Produtivo" | "Improdutivo",
  "resposta": "string"
}

REGRAS DE RESPOSTA (use exatamente estes textos):
- Se "Improdutivo":
  "resposta": "Obrigado pelo contato! Vimos sua mensagem. Responderemos assim que possível."
- Se "Produtivo":
  "resposta": "Obrigado pelo contato! Vimos sua demanda e vamos redirecioná-la para alguém responsável imediatamente."
- Não inclua comentários fora do JSON. Não use markdown. Retorne SOMENTE o JSON.
"#;

/// System instruction plus the user message carrying the email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the classification prompt for an already-trimmed email body.
pub fn build(email_text: &str) -> Prompt {
    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user: format!("Email recebido (pt-BR):\n---\n{email_text}\n---"),
    }
}
